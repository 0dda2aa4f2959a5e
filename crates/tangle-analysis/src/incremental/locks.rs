//! Per-component locks serializing work on the same connected component.

use std::sync::{Arc, Mutex, PoisonError};

use tangle_core::types::collections::FxHashMap;

use crate::graph::ComponentId;

#[derive(Debug, Default)]
pub struct ComponentLocks {
    locks: Mutex<FxHashMap<ComponentId, Arc<Mutex<()>>>>,
}

impl ComponentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding `component`, created on first use.
    pub fn lock_for(&self, component: ComponentId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(component).or_default())
    }

    /// Drop locks nobody holds, keeping the table proportional to live components.
    pub fn prune(&self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
