//! TangleEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Handlers only override the events they care about. `Send + Sync` because
/// events are emitted from the recompute scheduler's worker threads.
pub trait TangleEventHandler: Send + Sync {
    fn on_facts_ingested(&self, _event: &FactsIngestedEvent) {}
    fn on_cycle_detected(&self, _event: &CycleDetectedEvent) {}
    fn on_recompute_complete(&self, _event: &RecomputeCompleteEvent) {}
    fn on_diagnostic(&self, _event: &DiagnosticEvent) {}
}
