//! Result types returned by the engine API.

use serde::{Deserialize, Serialize};
use tangle_core::types::{SnapshotId, SymbolId};

/// Per-batch ingestion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
}

impl IngestSummary {
    pub fn effective(&self) -> usize {
        self.inserted + self.updated + self.removed
    }
}

/// What a recompute run did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecomputeReport {
    pub snapshot: Option<SnapshotId>,
    pub passes: usize,
    pub recomputed: usize,
    /// Symbols whose recomputation failed; they remain dirty.
    pub failed: Vec<SymbolId>,
    pub removed: usize,
    pub components_redetected: usize,
    pub cycles: usize,
    pub still_dirty: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    /// Mean over records with a maintainability index.
    pub avg_maintainability: Option<f64>,
    /// Mean cyclomatic complexity over symbols that report one.
    pub avg_complexity: Option<f64>,
    pub cycle_count: usize,
    /// Symbols whose hotspot score is at or above the configured threshold.
    pub hotspot_count: usize,
    pub symbol_count: usize,
    pub incomplete_count: usize,
}
