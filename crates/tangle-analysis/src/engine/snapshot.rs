//! Per-snapshot state: a serialized writer and a published read view.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tangle_core::constants::MAX_SNAPSHOT_DIAGNOSTICS;
use tangle_core::types::collections::{BTreeMap, FxHashMap, FxHashSet};
use tangle_core::types::{SnapshotId, SymbolId};

use crate::cycles::{CycleId, CycleKind, CycleReport};
use crate::diagnostics::Diagnostic;
use crate::facts::FactStore;
use crate::graph::GraphIndex;
use crate::incremental::{ComponentLocks, RecomputeController};
use crate::metrics::MetricsRecord;

/// Mutable side, guarded by the snapshot's writer mutex.
#[derive(Debug)]
pub(crate) struct SnapshotWriter {
    pub(crate) facts: FactStore,
    pub(crate) controller: RecomputeController,
}

/// Immutable analysis results published after each recompute.
///
/// Readers clone the `Arc<SnapshotView>` and never block the writer.
#[derive(Debug)]
pub struct SnapshotView {
    pub(crate) epoch: u64,
    pub(crate) index: Arc<GraphIndex>,
    pub(crate) metrics: FxHashMap<SymbolId, Arc<MetricsRecord>>,
    pub(crate) cycles: BTreeMap<CycleId, CycleReport>,
    pub(crate) circular_edges: FxHashSet<(SymbolId, SymbolId)>,
}

impl SnapshotView {
    pub(crate) fn new(
        epoch: u64,
        index: Arc<GraphIndex>,
        metrics: FxHashMap<SymbolId, Arc<MetricsRecord>>,
        cycles: BTreeMap<CycleId, CycleReport>,
    ) -> Self {
        let circular_edges = cycles
            .values()
            .filter(|c| c.kind == CycleKind::Dependency)
            .flat_map(|c| c.edges())
            .collect();
        Self {
            epoch,
            index,
            metrics,
            cycles,
            circular_edges,
        }
    }

    pub fn index(&self) -> &Arc<GraphIndex> {
        &self.index
    }

    pub fn metrics(&self, symbol: SymbolId) -> Option<&Arc<MetricsRecord>> {
        self.metrics.get(&symbol)
    }

    pub fn cycles(&self) -> impl Iterator<Item = &CycleReport> {
        self.cycles.values()
    }

    pub fn is_circular_edge(&self, source: SymbolId, target: SymbolId) -> bool {
        self.circular_edges.contains(&(source, target))
    }
}

pub(crate) struct SnapshotHandle {
    pub(crate) id: SnapshotId,
    writer: Mutex<SnapshotWriter>,
    view: RwLock<Arc<SnapshotView>>,
    diagnostics: Mutex<VecDeque<Diagnostic>>,
    pub(crate) locks: ComponentLocks,
}

impl SnapshotHandle {
    pub(crate) fn new(id: SnapshotId, epoch: u64) -> Self {
        let facts = FactStore::new(id.clone());
        let index = Arc::new(facts.build_index());
        Self {
            writer: Mutex::new(SnapshotWriter {
                facts,
                controller: RecomputeController::new(),
            }),
            view: RwLock::new(Arc::new(SnapshotView::new(
                epoch,
                index,
                FxHashMap::default(),
                BTreeMap::new(),
            ))),
            diagnostics: Mutex::new(VecDeque::new()),
            locks: ComponentLocks::new(),
            id,
        }
    }

    /// A panicked writer leaves facts consistent at mutation granularity, so
    /// poisoning is recovered rather than propagated.
    pub(crate) fn writer(&self) -> MutexGuard<'_, SnapshotWriter> {
        self.writer.lock().unwrap_or_else(|poisoned| {
            tracing::warn!(snapshot = %self.id, "recovering poisoned snapshot writer");
            poisoned.into_inner()
        })
    }

    pub(crate) fn view(&self) -> Arc<SnapshotView> {
        Arc::clone(&self.view.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn publish(&self, view: SnapshotView) {
        let mut slot = self.view.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Arc::new(view);
    }

    pub(crate) fn push_diagnostic(&self, diagnostic: Diagnostic) {
        let mut ring = self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner);
        if ring.len() == MAX_SNAPSHOT_DIAGNOSTICS {
            ring.pop_front();
        }
        ring.push_back(diagnostic);
    }

    pub(crate) fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}
