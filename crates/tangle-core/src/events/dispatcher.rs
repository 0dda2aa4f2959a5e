//! EventDispatcher: synchronous dispatch, panicking handlers are isolated.

use std::sync::Arc;

use super::handler::TangleEventHandler;
use super::types::*;

#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn TangleEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn TangleEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// A handler that panics does not prevent later handlers from receiving
    /// the event.
    fn emit<F: Fn(&dyn TangleEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!("event handler panicked; continuing with remaining handlers");
            }
        }
    }

    pub fn emit_facts_ingested(&self, event: &FactsIngestedEvent) {
        self.emit(|h| h.on_facts_ingested(event));
    }

    pub fn emit_cycle_detected(&self, event: &CycleDetectedEvent) {
        self.emit(|h| h.on_cycle_detected(event));
    }

    pub fn emit_recompute_complete(&self, event: &RecomputeCompleteEvent) {
        self.emit(|h| h.on_recompute_complete(event));
    }

    pub fn emit_diagnostic(&self, event: &DiagnosticEvent) {
        self.emit(|h| h.on_diagnostic(event));
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
