//! Persistence seam between the engine and a storage backend.

use tangle_core::errors::StorageError;
use tangle_core::types::{SnapshotId, SymbolId};

use crate::cycles::CycleReport;
use crate::facts::{CallEdge, DependencyEdge, FactMutation, Symbol};
use crate::metrics::MetricsRecord;

/// Current facts of a snapshot as held by a repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotFacts {
    pub symbols: Vec<Symbol>,
    pub dependencies: Vec<DependencyEdge>,
    pub calls: Vec<CallEdge>,
}

impl SnapshotFacts {
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.dependencies.is_empty() && self.calls.is_empty()
    }
}

/// Append-only fact log plus current state, keyed by (snapshot, entity).
///
/// Implementations must be callable from any thread. Every method is one
/// atomic unit: either all of `mutations`/`records` are written or none.
pub trait FactRepository: Send + Sync {
    /// Append to the fact log and apply to the current-state tables.
    fn append_mutations(&self, snapshot: &SnapshotId, mutations: &[FactMutation]) -> Result<(), StorageError>;

    fn store_metrics(&self, snapshot: &SnapshotId, records: &[MetricsRecord]) -> Result<(), StorageError>;

    fn remove_metrics(&self, snapshot: &SnapshotId, symbols: &[SymbolId]) -> Result<(), StorageError>;

    /// Replace the snapshot's whole cycle set.
    fn replace_cycles(&self, snapshot: &SnapshotId, cycles: &[CycleReport]) -> Result<(), StorageError>;

    /// `None` when the repository has never seen the snapshot.
    fn load_snapshot(&self, snapshot: &SnapshotId) -> Result<Option<SnapshotFacts>, StorageError>;

    fn drop_snapshot(&self, snapshot: &SnapshotId) -> Result<(), StorageError>;
}
