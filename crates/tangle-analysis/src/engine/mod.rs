//! AnalysisEngine: the embedding service's entry point.
//!
//! Facts are submitted per snapshot and applied under that snapshot's writer
//! lock. `recompute` drains the dirty set through the component-parallel
//! scheduler and publishes a new immutable [`SnapshotView`]. Queries only
//! ever read the last published view, so they never block on a recompute.

mod queries;
mod snapshot;
mod types;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use moka::sync::Cache;
use tangle_core::config::{EngineConfig, TangleConfig};
use tangle_core::errors::{EngineError, IngestError, QueryError, RecomputeError, StorageError};
use tangle_core::events::{
    CycleDetectedEvent, EventDispatcher, FactsIngestedEvent, RecomputeCompleteEvent, TangleEventHandler,
};
use tangle_core::traits::{Cancellable, CancellationToken};
use tangle_core::types::collections::{FxHashMap, FxHashSet};
use tangle_core::types::{SnapshotId, SymbolId};

use crate::call_paths::{CallChain, TraversalDirection};
use crate::cycles::{CycleDetector, CycleId, CycleReport};
use crate::diagnostics::{Diagnostic, DiagnosticsHub};
use crate::facts::{
    CallEdge, CallKey, ChangeKind, DependencyEdge, DependencyKey, FactChange, FactMutation, FactStore, Symbol,
};
use crate::incremental::{run_pass, PassContext, RecomputeState};
use crate::metrics::{MetricsEngine, MetricsPolicy, MetricsRecord};
use crate::repository::FactRepository;

use snapshot::{SnapshotHandle, SnapshotWriter};
pub use snapshot::SnapshotView;
pub use types::{HealthSummary, IngestSummary, RecomputeReport};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ChainKey {
    epoch: u64,
    symbol: SymbolId,
    depth: u32,
    direction: TraversalDirection,
}

pub struct AnalysisEngine {
    config: EngineConfig,
    persist_metrics: bool,
    snapshots: RwLock<FxHashMap<SnapshotId, Arc<SnapshotHandle>>>,
    diagnostics: DiagnosticsHub,
    events: EventDispatcher,
    repository: Option<Arc<dyn FactRepository>>,
    chain_cache: Cache<ChainKey, Arc<CallChain>>,
    metrics: MetricsEngine,
    detector: CycleDetector,
    /// Every published view gets a fresh epoch, across all snapshots.
    epochs: AtomicU64,
    revisions: AtomicU64,
}

impl AnalysisEngine {
    pub fn new(config: EngineConfig) -> Self {
        let chain_cache = Cache::builder()
            .max_capacity(config.effective_chain_cache_capacity())
            .build();
        Self {
            persist_metrics: true,
            snapshots: RwLock::new(FxHashMap::default()),
            diagnostics: DiagnosticsHub::new(),
            events: EventDispatcher::new(),
            repository: None,
            chain_cache,
            metrics: MetricsEngine::new(MetricsPolicy::from_config(&config)),
            detector: CycleDetector::new(config.effective_max_traversal_depth()),
            epochs: AtomicU64::new(0),
            revisions: AtomicU64::new(0),
            config,
        }
    }

    pub fn from_config(config: &TangleConfig) -> Self {
        let mut engine = Self::new(config.engine.clone());
        engine.persist_metrics = config.storage.effective_persist_metrics();
        engine
    }

    /// Write facts, metrics and cycles through to `repository`.
    pub fn with_repository(mut self, repository: Arc<dyn FactRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn TangleEventHandler>) -> Self {
        self.events.register(handler);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Known snapshots, ascending.
    pub fn snapshot_ids(&self) -> Vec<SnapshotId> {
        let mut ids: Vec<SnapshotId> = self.read_snapshots().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Receiver for every diagnostic the engine raises. Receivers share one queue.
    pub fn diagnostics(&self) -> crossbeam_channel::Receiver<Diagnostic> {
        self.diagnostics.subscribe()
    }

    /// Most recent diagnostics retained for one snapshot, oldest first.
    pub fn snapshot_diagnostics(&self, snapshot: &SnapshotId) -> Result<Vec<Diagnostic>, EngineError> {
        Ok(self.handle(snapshot)?.diagnostics())
    }

    // ---- ingestion ----

    /// Insert or replace symbols. The snapshot is created on first use.
    pub fn submit_symbols(&self, snapshot: &SnapshotId, symbols: Vec<Symbol>) -> Result<IngestSummary, EngineError> {
        let handle = self.handle_or_create(snapshot);
        self.ingest(&handle, symbols, FactStore::validate_symbol, FactStore::upsert_symbol)
    }

    /// Insert or replace dependency edges. Fails with `DanglingReference`,
    /// leaving the snapshot untouched, when any endpoint is unknown.
    pub fn submit_dependencies(
        &self,
        snapshot: &SnapshotId,
        edges: Vec<DependencyEdge>,
    ) -> Result<IngestSummary, EngineError> {
        let handle = self.handle_or_create(snapshot);
        self.ingest(&handle, edges, FactStore::validate_dependency, FactStore::upsert_dependency)
    }

    pub fn submit_calls(&self, snapshot: &SnapshotId, edges: Vec<CallEdge>) -> Result<IngestSummary, EngineError> {
        let handle = self.handle_or_create(snapshot);
        self.ingest(&handle, edges, FactStore::validate_call, FactStore::upsert_call)
    }

    /// Remove symbols together with every edge touching them.
    pub fn remove_symbols(&self, snapshot: &SnapshotId, ids: &[SymbolId]) -> Result<IngestSummary, EngineError> {
        let handle = self.handle(snapshot)?;
        self.ingest(&handle, ids.to_vec(), |_, _| Ok(()), |store, id| Ok(store.remove_symbol(id)))
    }

    pub fn remove_dependencies(
        &self,
        snapshot: &SnapshotId,
        keys: &[DependencyKey],
    ) -> Result<IngestSummary, EngineError> {
        let handle = self.handle(snapshot)?;
        self.ingest(&handle, keys.to_vec(), |_, _| Ok(()), |store, key| Ok(store.remove_dependency(key)))
    }

    pub fn remove_calls(&self, snapshot: &SnapshotId, keys: &[CallKey]) -> Result<IngestSummary, EngineError> {
        let handle = self.handle(snapshot)?;
        self.ingest(&handle, keys.to_vec(), |_, _| Ok(()), |store, key| Ok(store.remove_call(key)))
    }

    /// Whole batches are validated before anything is applied. With a
    /// repository attached the batch is staged on a copy of the store and
    /// only swapped in once the fact log append succeeded.
    fn ingest<T>(
        &self,
        handle: &SnapshotHandle,
        facts: Vec<T>,
        validate: impl Fn(&FactStore, &T) -> Result<(), IngestError>,
        apply: impl Fn(&mut FactStore, T) -> Result<FactChange, IngestError>,
    ) -> Result<IngestSummary, EngineError> {
        let mut guard = handle.writer();
        let writer: &mut SnapshotWriter = &mut guard;
        for fact in &facts {
            validate(&writer.facts, fact)?;
        }

        let mut staged = self.repository.as_ref().map(|_| writer.facts.clone());
        let target = match staged.as_mut() {
            Some(store) => store,
            None => &mut writer.facts,
        };
        let mut summary = IngestSummary::default();
        let mut effective: Vec<FactChange> = Vec::new();
        for fact in facts {
            let change = apply(&mut *target, fact)?;
            match change.kind {
                ChangeKind::Inserted => summary.inserted += 1,
                ChangeKind::Updated => summary.updated += 1,
                ChangeKind::Unchanged => summary.unchanged += 1,
                ChangeKind::Removed => summary.removed += 1,
            }
            if change.is_effective() {
                effective.push(change);
            }
        }

        if let Some(repository) = &self.repository {
            if !effective.is_empty() {
                let log: Vec<FactMutation> = effective.iter().map(|c| c.mutation.clone()).collect();
                repository.append_mutations(&handle.id, &log).map_err(|err| {
                    tracing::error!(snapshot = %handle.id, error = %err, "fact log append failed, batch discarded");
                    EngineError::from(err)
                })?;
            }
        }
        if let Some(store) = staged {
            writer.facts = store;
        }
        for change in &effective {
            writer.controller.record(change);
        }
        drop(guard);

        tracing::debug!(
            snapshot = %handle.id,
            inserted = summary.inserted,
            updated = summary.updated,
            unchanged = summary.unchanged,
            removed = summary.removed,
            "facts ingested"
        );
        self.events.emit_facts_ingested(&FactsIngestedEvent {
            snapshot: handle.id.clone(),
            inserted: summary.inserted,
            updated: summary.updated,
            unchanged: summary.unchanged,
            removed: summary.removed,
        });
        Ok(summary)
    }

    // ---- snapshot lifecycle ----

    /// Forget a snapshot and everything derived from it. Returns whether it existed.
    pub fn drop_snapshot(&self, snapshot: &SnapshotId) -> Result<bool, EngineError> {
        let existed = self
            .snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(snapshot)
            .is_some();
        if let Some(repository) = &self.repository {
            repository.drop_snapshot(snapshot)?;
        }
        tracing::info!(snapshot = %snapshot, existed, "snapshot dropped");
        Ok(existed)
    }

    /// Rebuild a snapshot from the repository's current-state tables and
    /// schedule a full recompute. Returns `false` when the repository has
    /// nothing for it or the engine already holds it.
    pub fn restore_snapshot(&self, snapshot: &SnapshotId) -> Result<bool, EngineError> {
        let Some(repository) = &self.repository else {
            return Ok(false);
        };
        if self.read_snapshots().contains_key(snapshot) {
            return Ok(false);
        }
        let Some(facts) = repository.load_snapshot(snapshot)? else {
            return Ok(false);
        };

        let handle = self.handle_or_create(snapshot);
        let mut guard = handle.writer();
        let writer: &mut SnapshotWriter = &mut guard;
        for symbol in facts.symbols {
            writer.facts.upsert_symbol(symbol)?;
        }
        for edge in facts.dependencies {
            writer.facts.upsert_dependency(edge)?;
        }
        for edge in facts.calls {
            writer.facts.upsert_call(edge)?;
        }
        writer.controller.mark_all();
        let (symbols, dependencies, calls) = writer.facts.counts();
        tracing::info!(snapshot = %snapshot, symbols, dependencies, calls, "snapshot restored");
        Ok(true)
    }

    /// Recomputation state of one symbol as seen by the writer.
    pub fn symbol_state(&self, snapshot: &SnapshotId, symbol: SymbolId) -> Result<RecomputeState, EngineError> {
        let handle = self.handle(snapshot)?;
        let writer = handle.writer();
        if !writer.facts.contains_symbol(symbol) {
            return Err(QueryError::UnknownSymbol {
                snapshot: snapshot.clone(),
                symbol,
            }
            .into());
        }
        Ok(writer.controller.state(symbol))
    }

    // ---- recomputation ----

    /// Recompute everything dirtied since the last run.
    pub fn recompute(&self, snapshot: &SnapshotId) -> Result<RecomputeReport, EngineError> {
        let handle = self.handle(snapshot)?;
        self.run_recompute(&handle, &CancellationToken::new(), false)
    }

    /// Full analysis of a snapshot: every symbol and every component.
    ///
    /// Cancellation is checked between symbols. Results computed before the
    /// token fired are published, the rest stay Dirty, and the call returns
    /// [`EngineError::Cancelled`].
    pub fn analyze_snapshot(
        &self,
        snapshot: &SnapshotId,
        cancel: &CancellationToken,
    ) -> Result<RecomputeReport, EngineError> {
        let handle = self.handle(snapshot)?;
        self.run_recompute(&handle, cancel, true)
    }

    fn run_recompute(
        &self,
        handle: &SnapshotHandle,
        cancel: &CancellationToken,
        full: bool,
    ) -> Result<RecomputeReport, EngineError> {
        let started = Instant::now();
        let mut guard = handle.writer();
        let writer: &mut SnapshotWriter = &mut guard;
        if full {
            writer.controller.mark_all();
        }

        let previous = handle.view();
        let mut report = RecomputeReport {
            snapshot: Some(handle.id.clone()),
            ..Default::default()
        };
        if !writer.controller.has_pending_work() {
            report.cycles = previous.cycles.len();
            return Ok(report);
        }

        let index = if previous.index.generation() == writer.facts.generation() {
            Arc::clone(&previous.index)
        } else {
            Arc::new(writer.facts.build_index())
        };
        let max_depth = self.config.effective_max_traversal_depth();
        writer.controller.expand(&index, max_depth);
        let removed = writer.controller.take_removed();

        let mut metrics = previous.metrics.clone();
        let mut cycles = previous.cycles.clone();
        let mut changed: Vec<MetricsRecord> = Vec::new();
        for id in &removed {
            metrics.remove(id);
        }
        let cycles_before = cycles.len();
        cycles.retain(|_, c| c.members.iter().all(|m| index.contains(*m)));
        let mut cycles_changed = cycles.len() != cycles_before;
        let mut new_cycles: Vec<CycleReport> = Vec::new();
        report.removed = removed.len();

        let ctx = PassContext {
            index: &index,
            metrics: &self.metrics,
            detector: &self.detector,
            locks: &handle.locks,
            cancel,
        };
        let batch_size = self.config.effective_recompute_batch_size();
        let mut attempted: FxHashSet<SymbolId> = FxHashSet::default();

        while !cancel.is_cancelled() {
            let work = writer.controller.plan(&index, batch_size, &attempted);
            if work.is_empty() {
                break;
            }
            report.passes += 1;
            for unit in &work {
                attempted.extend(unit.symbols.iter().copied());
            }

            for outcome in run_pass(&ctx, work) {
                for err in &outcome.diagnostics {
                    self.raise(handle, Diagnostic::from_traversal(&handle.id, err));
                }
                if outcome.cycles_deferred {
                    writer.controller.defer_cycles(outcome.component);
                }
                if let Some(detected) = outcome.cycles {
                    report.components_redetected += 1;
                    let members: FxHashSet<SymbolId> =
                        index.component_members(outcome.component).iter().copied().collect();
                    let stale: FxHashSet<CycleId> = cycles
                        .iter()
                        .filter(|(_, c)| c.members.iter().any(|m| members.contains(m)))
                        .map(|(id, _)| *id)
                        .collect();
                    let fresh: FxHashSet<CycleId> = detected.iter().map(|c| c.id).collect();
                    if stale != fresh {
                        cycles_changed = true;
                    }
                    cycles.retain(|id, _| !stale.contains(id));
                    for cycle in detected {
                        if !stale.contains(&cycle.id) {
                            new_cycles.push(cycle.clone());
                        }
                        cycles.insert(cycle.id, cycle);
                    }
                }

                for computed in outcome.computed {
                    let symbol = computed.record.symbol;
                    match computed.error {
                        None => writer.controller.complete(symbol),
                        Some(err) => {
                            let err = RecomputeError::from(err);
                            self.raise(handle, Diagnostic::from_recompute(&handle.id, &err));
                            writer.controller.fail(symbol);
                            report.failed.push(symbol);
                        }
                    }
                    report.recomputed += 1;
                    let unchanged = metrics
                        .get(&symbol)
                        .is_some_and(|existing| existing.same_values(&computed.record));
                    if !unchanged {
                        let mut record = computed.record;
                        record.revision = self.revisions.fetch_add(1, Ordering::Relaxed) + 1;
                        changed.push(record.clone());
                        metrics.insert(symbol, Arc::new(record));
                    }
                }
                for symbol in outcome.skipped {
                    writer.controller.fail(symbol);
                }
            }
        }

        let cancelled = cancel.is_cancelled();
        report.cycles = cycles.len();
        report.still_dirty = writer.controller.dirty_count();
        let persisted_cycles: Option<Vec<CycleReport>> = cycles_changed.then(|| cycles.values().cloned().collect());

        let epoch = self.epochs.fetch_add(1, Ordering::Relaxed) + 1;
        handle.publish(SnapshotView::new(epoch, Arc::clone(&index), metrics, cycles));
        handle.locks.prune();

        self.persist(handle, &changed, &removed, persisted_cycles.as_deref());
        drop(guard);

        for cycle in &new_cycles {
            tracing::info!(
                snapshot = %handle.id,
                cycle = %cycle.id,
                kind = cycle.kind.name(),
                length = cycle.length,
                severity = cycle.severity.name(),
                "cycle detected"
            );
            self.events.emit_cycle_detected(&CycleDetectedEvent {
                snapshot: handle.id.clone(),
                cycle_id: cycle.id.to_hex(),
                members: cycle.members.clone(),
                severity: cycle.severity.name().to_string(),
            });
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            snapshot = %handle.id,
            passes = report.passes,
            recomputed = report.recomputed,
            failed = report.failed.len(),
            removed = report.removed,
            cycles = report.cycles,
            still_dirty = report.still_dirty,
            duration_ms = report.duration_ms,
            cancelled,
            "recompute finished"
        );
        self.events.emit_recompute_complete(&RecomputeCompleteEvent {
            snapshot: handle.id.clone(),
            recomputed: report.recomputed,
            failed: report.failed.len(),
            still_dirty: report.still_dirty,
            duration_ms: report.duration_ms,
        });

        if cancelled {
            return Err(EngineError::Cancelled);
        }
        Ok(report)
    }

    /// Write-through of derived results. Failures never fail the recompute;
    /// they surface as storage diagnostics.
    fn persist(
        &self,
        handle: &SnapshotHandle,
        changed: &[MetricsRecord],
        removed: &[SymbolId],
        cycles: Option<&[CycleReport]>,
    ) {
        let Some(repository) = &self.repository else {
            return;
        };
        let mut failures: Vec<StorageError> = Vec::new();
        if self.persist_metrics && !changed.is_empty() {
            failures.extend(repository.store_metrics(&handle.id, changed).err());
        }
        if !removed.is_empty() {
            failures.extend(repository.remove_metrics(&handle.id, removed).err());
        }
        if let Some(cycles) = cycles {
            failures.extend(repository.replace_cycles(&handle.id, cycles).err());
        }
        for err in failures {
            tracing::warn!(snapshot = %handle.id, error = %err, "persisting analysis results failed");
            self.raise(handle, Diagnostic::from_storage(&handle.id, &err));
        }
    }

    // ---- internals ----

    fn raise(&self, handle: &SnapshotHandle, diagnostic: Diagnostic) {
        tracing::debug!(
            snapshot = %diagnostic.snapshot,
            code = %diagnostic.code,
            message = %diagnostic.message,
            "diagnostic"
        );
        self.events.emit_diagnostic(&diagnostic.to_event());
        handle.push_diagnostic(diagnostic.clone());
        self.diagnostics.publish(diagnostic);
    }

    fn read_snapshots(&self) -> std::sync::RwLockReadGuard<'_, FxHashMap<SnapshotId, Arc<SnapshotHandle>>> {
        self.snapshots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle(&self, snapshot: &SnapshotId) -> Result<Arc<SnapshotHandle>, QueryError> {
        self.read_snapshots()
            .get(snapshot)
            .cloned()
            .ok_or_else(|| QueryError::UnknownSnapshot {
                snapshot: snapshot.clone(),
            })
    }

    fn handle_or_create(&self, snapshot: &SnapshotId) -> Arc<SnapshotHandle> {
        if let Some(handle) = self.read_snapshots().get(snapshot) {
            return Arc::clone(handle);
        }
        let mut snapshots = self.snapshots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(snapshots.entry(snapshot.clone()).or_insert_with(|| {
            tracing::info!(snapshot = %snapshot, "snapshot created");
            let epoch = self.epochs.fetch_add(1, Ordering::Relaxed) + 1;
            Arc::new(SnapshotHandle::new(snapshot.clone(), epoch))
        }))
    }

    fn view(&self, snapshot: &SnapshotId) -> Result<(Arc<SnapshotHandle>, Arc<SnapshotView>), QueryError> {
        let handle = self.handle(snapshot)?;
        let view = handle.view();
        Ok((handle, view))
    }

    /// Distinguishes a symbol the view has no record for yet from one that
    /// was never submitted.
    fn missing_symbol(&self, handle: &SnapshotHandle, symbol: SymbolId) -> QueryError {
        if handle.writer().facts.contains_symbol(symbol) {
            QueryError::MetricsPending {
                snapshot: handle.id.clone(),
                symbol,
            }
        } else {
            QueryError::UnknownSymbol {
                snapshot: handle.id.clone(),
                symbol,
            }
        }
    }
}

impl std::fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisEngine")
            .field("config", &self.config)
            .field("snapshots", &self.read_snapshots().len())
            .field("repository", &self.repository.is_some())
            .field("events", &self.events)
            .finish()
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
