//! Event payload types.

use crate::types::{SnapshotId, SymbolId};

/// Payload for `on_facts_ingested`.
#[derive(Debug, Clone)]
pub struct FactsIngestedEvent {
    pub snapshot: SnapshotId,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
}

/// Payload for `on_cycle_detected`.
#[derive(Debug, Clone)]
pub struct CycleDetectedEvent {
    pub snapshot: SnapshotId,
    pub cycle_id: String,
    pub members: Vec<SymbolId>,
    pub severity: String,
}

/// Payload for `on_recompute_complete`.
#[derive(Debug, Clone)]
pub struct RecomputeCompleteEvent {
    pub snapshot: SnapshotId,
    pub recomputed: usize,
    pub failed: usize,
    pub still_dirty: usize,
    pub duration_ms: u64,
}

/// Payload for `on_diagnostic`.
#[derive(Debug, Clone)]
pub struct DiagnosticEvent {
    pub snapshot: SnapshotId,
    pub symbol: Option<SymbolId>,
    pub code: String,
    pub message: String,
}
