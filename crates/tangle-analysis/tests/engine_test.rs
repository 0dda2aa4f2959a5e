//! End-to-end behavior of the analysis engine: ingestion, cycle reports,
//! incremental recomputation, queries and the repository seam.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tangle_analysis::call_paths::Centrality;
use tangle_analysis::cycles::{CycleKind, CycleSeverity, RecursionKind};
use tangle_analysis::diagnostics::DiagnosticKind;
use tangle_analysis::facts::{
    CallEdge, DependencyEdge, DependencyKind, FactMutation, FactStore, RawMetrics, Symbol, SymbolKind,
};
use tangle_analysis::incremental::RecomputeState;
use tangle_analysis::metrics::MetricsRecord;
use tangle_analysis::repository::{FactRepository, SnapshotFacts};
use tangle_analysis::cycles::CycleReport;
use tangle_analysis::AnalysisEngine;
use tangle_core::config::EngineConfig;
use tangle_core::errors::{EngineError, IngestError, QueryError, StorageError};
use tangle_core::events::{CycleDetectedEvent, TangleEventHandler};
use tangle_core::traits::{Cancellable, CancellationToken};
use tangle_core::types::{SnapshotId, SymbolId};

// ═══════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════

fn snap() -> SnapshotId {
    SnapshotId::from("main@c0ffee")
}

fn func(id: u64) -> Symbol {
    Symbol::new(id, format!("f{id}"), SymbolKind::Function).with_raw_metrics(RawMetrics::complete(3, 120.0, 25))
}

fn dep(source: u64, target: u64) -> DependencyEdge {
    DependencyEdge::new(source, target, DependencyKind::Import)
}

fn call(caller: u64, callee: u64) -> CallEdge {
    CallEdge::new(caller, callee)
}

fn engine_with(ids: impl IntoIterator<Item = u64>) -> AnalysisEngine {
    let engine = AnalysisEngine::default();
    engine
        .submit_symbols(&snap(), ids.into_iter().map(func).collect())
        .unwrap();
    engine
}

// ═══════════════════════════════════════════════════════════════════════════
// INGESTION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn resubmitting_identical_facts_is_a_no_op() {
    let engine = engine_with(1..=3);
    let s = snap();
    let first = engine.submit_dependencies(&s, vec![dep(1, 2), dep(2, 3)]).unwrap();
    assert_eq!(first.inserted, 2);
    engine.recompute(&s).unwrap();

    let again = engine.submit_symbols(&s, (1..=3).map(func).collect()).unwrap();
    assert_eq!(again.unchanged, 3);
    assert_eq!(again.effective(), 0);
    let again = engine.submit_dependencies(&s, vec![dep(1, 2), dep(2, 3)]).unwrap();
    assert_eq!(again.unchanged, 2);

    let report = engine.recompute(&s).unwrap();
    assert_eq!(report.passes, 0);
    assert_eq!(report.recomputed, 0);
}

#[test]
fn dangling_edge_rejects_the_whole_batch() {
    let engine = engine_with(1..=2);
    let s = snap();
    let err = engine
        .submit_dependencies(&s, vec![dep(1, 2), dep(1, 99)])
        .unwrap_err();
    match err {
        EngineError::Ingest(IngestError::DanglingReference { missing, .. }) => {
            assert_eq!(missing, SymbolId(99));
        }
        other => panic!("expected DanglingReference, got {other:?}"),
    }

    engine.recompute(&s).unwrap();
    assert!(engine.get_dependencies(&s, SymbolId(1)).unwrap().is_empty());
}

#[test]
fn out_of_range_probability_is_invalid() {
    let engine = engine_with(1..=2);
    let err = engine
        .submit_calls(&snap(), vec![call(1, 2).with_probability(1.5)])
        .unwrap_err();
    assert!(matches!(err, EngineError::Ingest(IngestError::InvalidFact { .. })));
}

#[test]
fn removing_a_symbol_drops_its_record_and_edges() {
    let engine = engine_with(1..=3);
    let s = snap();
    engine.submit_dependencies(&s, vec![dep(1, 2), dep(2, 3)]).unwrap();
    engine.recompute(&s).unwrap();
    assert_eq!(engine.get_metrics(&s, SymbolId(1)).unwrap().dependency_depth, 2);

    let summary = engine.remove_symbols(&s, &[SymbolId(2)]).unwrap();
    assert_eq!(summary.removed, 1);
    let report = engine.recompute(&s).unwrap();
    assert_eq!(report.removed, 1);

    assert!(matches!(
        engine.get_metrics(&s, SymbolId(2)),
        Err(EngineError::Query(QueryError::UnknownSymbol { .. }))
    ));
    let a = engine.get_metrics(&s, SymbolId(1)).unwrap();
    assert_eq!(a.outgoing_count, 0);
    assert_eq!(a.dependency_depth, 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// CYCLES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn self_dependency_is_one_cycle_of_length_one() {
    let engine = engine_with([1]);
    let s = snap();
    engine.submit_dependencies(&s, vec![dep(1, 1)]).unwrap();
    engine.recompute(&s).unwrap();

    let cycles = engine.list_cycles(&s, CycleSeverity::Low).unwrap();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].length, 1);
    assert_eq!(cycles[0].members, vec![SymbolId(1)]);
    assert_eq!(cycles[0].kind, CycleKind::Dependency);
}

#[test]
fn cycle_id_does_not_depend_on_submission_order() {
    let s = snap();
    let forward = engine_with(1..=3);
    forward.submit_dependencies(&s, vec![dep(1, 2), dep(2, 3), dep(3, 1)]).unwrap();
    forward.recompute(&s).unwrap();

    let rotated = engine_with(1..=3);
    rotated.submit_dependencies(&s, vec![dep(2, 3)]).unwrap();
    rotated.submit_dependencies(&s, vec![dep(3, 1)]).unwrap();
    rotated.submit_dependencies(&s, vec![dep(1, 2)]).unwrap();
    rotated.recompute(&s).unwrap();

    let a = forward.list_cycles(&s, CycleSeverity::Low).unwrap();
    let b = rotated.list_cycles(&s, CycleSeverity::Low).unwrap();
    assert_eq!(a.len(), 1);
    assert_eq!(a[0].length, 3);
    assert_eq!(a[0].members, vec![SymbolId(1), SymbolId(2), SymbolId(3)]);
    assert_eq!(a[0].id, b[0].id);
}

#[test]
fn cycle_edges_are_projected_as_circular() {
    let engine = engine_with(1..=3);
    let s = snap();
    engine
        .submit_dependencies(&s, vec![dep(1, 2), dep(2, 1), dep(2, 3)])
        .unwrap();
    engine.recompute(&s).unwrap();

    let edges = engine.get_dependencies(&s, SymbolId(2)).unwrap();
    let circular: Vec<(u64, bool)> = edges.iter().map(|e| (e.target.get(), e.flags.is_circular)).collect();
    assert_eq!(circular, vec![(1, true), (3, false)]);
}

#[test]
fn breaking_a_cycle_removes_its_report() {
    let engine = engine_with(1..=2);
    let s = snap();
    engine.submit_dependencies(&s, vec![dep(1, 2), dep(2, 1)]).unwrap();
    engine.recompute(&s).unwrap();
    assert_eq!(engine.list_cycles(&s, CycleSeverity::Low).unwrap().len(), 1);

    engine.remove_dependencies(&s, &[dep(2, 1).key()]).unwrap();
    engine.recompute(&s).unwrap();
    assert!(engine.list_cycles(&s, CycleSeverity::Low).unwrap().is_empty());
}

#[test]
fn recursion_is_tagged_by_length() {
    let engine = engine_with(1..=5);
    let s = snap();
    engine
        .submit_calls(&s, vec![call(1, 1), call(2, 3), call(3, 2), call(3, 4), call(4, 5), call(5, 3)])
        .unwrap();
    engine.recompute(&s).unwrap();

    let kinds: Vec<(Vec<u64>, CycleKind)> = engine
        .list_cycles(&s, CycleSeverity::Low)
        .unwrap()
        .into_iter()
        .map(|c| (c.members.iter().map(|m| m.get()).collect(), c.kind))
        .collect();
    assert!(kinds.contains(&(vec![1], CycleKind::Recursion(RecursionKind::Direct))));
    assert!(kinds.contains(&(vec![2, 3], CycleKind::Recursion(RecursionKind::Mutual))));
    assert!(kinds.contains(&(vec![3, 4, 5], CycleKind::Recursion(RecursionKind::Indirect))));
}

#[test]
fn min_severity_filters_cycles() {
    let engine = engine_with(1..=4);
    let s = snap();
    engine
        .submit_dependencies(&s, vec![dep(1, 1), dep(2, 3), dep(3, 4), dep(4, 2)])
        .unwrap();
    engine.recompute(&s).unwrap();

    let all = engine.list_cycles(&s, CycleSeverity::Low).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].severity >= all[1].severity);
    let severe = engine.list_cycles(&s, CycleSeverity::High).unwrap();
    assert_eq!(severe.len(), 1);
    assert_eq!(severe[0].length, 3);
}

// ═══════════════════════════════════════════════════════════════════════════
// INCREMENTAL RECOMPUTATION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn unrelated_record_keeps_identity_after_local_change() {
    let engine = engine_with(1..=3);
    let s = snap();
    engine.submit_dependencies(&s, vec![dep(1, 2)]).unwrap();
    engine.recompute(&s).unwrap();
    let c_before = engine.get_metrics(&s, SymbolId(3)).unwrap();
    let a_before = engine.get_metrics(&s, SymbolId(1)).unwrap();

    engine.submit_dependencies(&s, vec![dep(1, 2).at_line(40)]).unwrap();
    assert_eq!(engine.symbol_state(&s, SymbolId(1)).unwrap(), RecomputeState::Dirty);
    assert_eq!(engine.symbol_state(&s, SymbolId(3)).unwrap(), RecomputeState::Clean);
    let report = engine.recompute(&s).unwrap();
    assert_eq!(report.recomputed, 2);

    let c_after = engine.get_metrics(&s, SymbolId(3)).unwrap();
    assert!(Arc::ptr_eq(&c_before, &c_after));
    assert_eq!(c_before.revision, c_after.revision);

    let a_after = engine.get_metrics(&s, SymbolId(1)).unwrap();
    assert_eq!(a_after.outgoing_count, 2);
    assert!(a_after.revision > a_before.revision);
}

#[test]
fn full_analysis_keeps_unchanged_records() {
    let engine = engine_with(1..=4);
    let s = snap();
    engine.submit_dependencies(&s, vec![dep(1, 2), dep(3, 4)]).unwrap();
    engine.recompute(&s).unwrap();
    let before = engine.get_metrics(&s, SymbolId(4)).unwrap();

    let report = engine.analyze_snapshot(&s, &CancellationToken::new()).unwrap();
    assert_eq!(report.recomputed, 4);
    assert!(Arc::ptr_eq(&before, &engine.get_metrics(&s, SymbolId(4)).unwrap()));
}

#[test]
fn predecessors_of_a_changed_symbol_are_recomputed() {
    let engine = engine_with(1..=4);
    let s = snap();
    engine.submit_dependencies(&s, vec![dep(1, 2), dep(2, 3)]).unwrap();
    engine.recompute(&s).unwrap();
    assert_eq!(engine.get_metrics(&s, SymbolId(1)).unwrap().dependency_depth, 2);

    engine.submit_dependencies(&s, vec![dep(3, 4)]).unwrap();
    engine.recompute(&s).unwrap();
    assert_eq!(engine.get_metrics(&s, SymbolId(1)).unwrap().dependency_depth, 3);
    assert_eq!(engine.get_metrics(&s, SymbolId(3)).unwrap().dependency_depth, 1);
}

#[test]
fn metrics_are_pending_until_recompute() {
    let engine = engine_with([1]);
    let s = snap();
    assert!(matches!(
        engine.get_metrics(&s, SymbolId(1)),
        Err(EngineError::Query(QueryError::MetricsPending { .. }))
    ));
    assert!(matches!(
        engine.get_metrics(&SnapshotId::from("nope"), SymbolId(1)),
        Err(EngineError::Query(QueryError::UnknownSnapshot { .. }))
    ));
}

#[test]
fn cancelled_analysis_leaves_symbols_dirty() {
    let engine = engine_with(1..=3);
    let s = snap();
    let token = CancellationToken::new();
    token.cancel();

    let result = engine.analyze_snapshot(&s, &token);
    assert!(matches!(result, Err(EngineError::Cancelled)));
    assert_eq!(engine.symbol_state(&s, SymbolId(2)).unwrap(), RecomputeState::Dirty);

    let report = engine.recompute(&s).unwrap();
    assert_eq!(report.recomputed, 3);
    assert_eq!(report.still_dirty, 0);
    assert!(engine.get_metrics(&s, SymbolId(2)).is_ok());
}

#[test]
fn missing_raw_metrics_yield_an_incomplete_record_and_a_diagnostic() {
    let engine = AnalysisEngine::default();
    let s = snap();
    engine
        .submit_symbols(&s, vec![Symbol::new(1u64, "bare", SymbolKind::Function)])
        .unwrap();
    let report = engine.recompute(&s).unwrap();
    assert_eq!(report.failed, vec![SymbolId(1)]);

    let record = engine.get_metrics(&s, SymbolId(1)).unwrap();
    assert!(!record.is_complete());
    assert!(record.maintainability_index.is_none());
    assert_eq!(engine.symbol_state(&s, SymbolId(1)).unwrap(), RecomputeState::Dirty);

    let diagnostics = engine.snapshot_diagnostics(&s).unwrap();
    assert!(diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::RecomputationFailure && d.symbol == Some(SymbolId(1))));
    assert!(engine.diagnostics().try_iter().any(|d| d.code == "RECOMPUTATION_FAILURE"));
}

// ═══════════════════════════════════════════════════════════════════════════
// QUERIES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn equal_hotspot_scores_order_by_symbol_id() {
    let engine = engine_with([1, 2, 3, 10]);
    let s = snap();
    engine
        .submit_calls(
            &s,
            vec![
                call(10, 3).with_frequency(2),
                call(10, 2).with_frequency(2),
                call(10, 1).with_frequency(1),
            ],
        )
        .unwrap();
    engine.recompute(&s).unwrap();

    let top = engine.top_hotspots(&s, 3).unwrap();
    assert_eq!(top, vec![(SymbolId(2), 6.0), (SymbolId(3), 6.0), (SymbolId(1), 3.0)]);
}

#[test]
fn health_summary_aggregates_published_records() {
    let engine = AnalysisEngine::new(EngineConfig {
        hotspot_threshold: Some(5.0),
        ..Default::default()
    });
    let s = snap();
    engine.submit_symbols(&s, (1..=3).map(func).collect()).unwrap();
    engine
        .submit_calls(&s, vec![call(1, 2).with_frequency(2), call(2, 2)])
        .unwrap();
    engine.recompute(&s).unwrap();

    let health = engine.get_health_summary(&s).unwrap();
    assert_eq!(health.symbol_count, 3);
    assert_eq!(health.cycle_count, 1);
    assert_eq!(health.hotspot_count, 1);
    assert_eq!(health.avg_complexity, Some(3.0));
    assert_eq!(health.incomplete_count, 0);
    let mi = health.avg_maintainability.unwrap();
    assert!((0.0..=100.0).contains(&mi));
}

#[test]
fn call_chain_and_hierarchy_mirror_each_other() {
    let engine = engine_with(1..=3);
    let s = snap();
    engine
        .submit_calls(&s, vec![call(1, 2).with_probability(0.5), call(2, 3).with_probability(0.5)])
        .unwrap();
    engine.recompute(&s).unwrap();

    let chain = engine.get_call_chain(&s, SymbolId(1), 10).unwrap();
    let longest = chain.paths.iter().max_by_key(|p| p.length).unwrap();
    assert_eq!(longest.symbols, vec![SymbolId(1), SymbolId(2), SymbolId(3)]);
    assert!((longest.probability - 0.25).abs() < 1e-12);

    let hierarchy = engine.get_call_hierarchy(&s, SymbolId(3), 10).unwrap();
    let longest = hierarchy.paths.iter().max_by_key(|p| p.length).unwrap();
    assert_eq!(longest.symbols, vec![SymbolId(1), SymbolId(2), SymbolId(3)]);

    let cached = engine.get_call_chain(&s, SymbolId(1), 10).unwrap();
    assert!(Arc::ptr_eq(&chain, &cached));
}

#[test]
fn centrality_follows_caller_counts() {
    let engine = AnalysisEngine::new(EngineConfig {
        hub_threshold: Some(2),
        ..Default::default()
    });
    let s = snap();
    engine.submit_symbols(&s, (1..=5).map(func).collect()).unwrap();
    engine
        .submit_calls(&s, vec![call(2, 1), call(3, 1), call(4, 1)])
        .unwrap();
    engine.recompute(&s).unwrap();

    assert_eq!(engine.centrality(&s, SymbolId(1)).unwrap(), Centrality::Hub);
    assert_eq!(engine.centrality(&s, SymbolId(5)).unwrap(), Centrality::Peripheral);
}

#[test]
fn snapshots_are_independent_and_comparable() {
    let engine = engine_with(1..=2);
    let base = snap();
    let next = SnapshotId::from("main@feed");
    engine.submit_symbols(&next, (1..=2).map(func).collect()).unwrap();
    engine.submit_dependencies(&next, vec![dep(1, 2)]).unwrap();
    engine.recompute(&base).unwrap();
    engine.recompute(&next).unwrap();

    assert_eq!(engine.get_metrics(&base, SymbolId(1)).unwrap().outgoing_count, 0);
    assert_eq!(engine.get_metrics(&next, SymbolId(1)).unwrap().outgoing_count, 1);

    let trends = engine.compare_snapshots(&base, &next).unwrap();
    assert_eq!(trends.len(), 2);
    assert_eq!(trends[0].symbol, SymbolId(1));

    assert!(engine.drop_snapshot(&base).unwrap());
    assert_eq!(engine.snapshot_ids(), vec![next]);
}

// ═══════════════════════════════════════════════════════════════════════════
// EVENTS & REPOSITORY
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct CycleCounter {
    seen: AtomicUsize,
}

impl TangleEventHandler for CycleCounter {
    fn on_cycle_detected(&self, _event: &CycleDetectedEvent) {
        self.seen.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn new_cycles_are_announced_once() {
    let counter = Arc::new(CycleCounter::default());
    let engine = AnalysisEngine::default().with_event_handler(counter.clone());
    let s = snap();
    engine.submit_symbols(&s, (1..=3).map(func).collect()).unwrap();
    engine.submit_dependencies(&s, vec![dep(1, 2), dep(2, 1)]).unwrap();
    engine.recompute(&s).unwrap();
    engine.submit_dependencies(&s, vec![dep(2, 3)]).unwrap();
    engine.recompute(&s).unwrap();

    assert_eq!(counter.seen.load(Ordering::SeqCst), 1);
}

/// Keeps current state by replaying the fact log into a `FactStore`.
#[derive(Default)]
struct MemoryRepository {
    facts: Mutex<HashMap<SnapshotId, FactStore>>,
    log: Mutex<Vec<FactMutation>>,
    metrics: Mutex<HashMap<SymbolId, MetricsRecord>>,
    cycles: Mutex<Vec<CycleReport>>,
}

impl FactRepository for MemoryRepository {
    fn append_mutations(&self, snapshot: &SnapshotId, mutations: &[FactMutation]) -> Result<(), StorageError> {
        let mut facts = self.facts.lock().unwrap();
        let store = facts
            .entry(snapshot.clone())
            .or_insert_with(|| FactStore::new(snapshot.clone()));
        for mutation in mutations {
            store.apply(mutation.clone()).map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
        }
        self.log.lock().unwrap().extend_from_slice(mutations);
        Ok(())
    }

    fn store_metrics(&self, _snapshot: &SnapshotId, records: &[MetricsRecord]) -> Result<(), StorageError> {
        let mut metrics = self.metrics.lock().unwrap();
        for record in records {
            metrics.insert(record.symbol, record.clone());
        }
        Ok(())
    }

    fn remove_metrics(&self, _snapshot: &SnapshotId, symbols: &[SymbolId]) -> Result<(), StorageError> {
        let mut metrics = self.metrics.lock().unwrap();
        for symbol in symbols {
            metrics.remove(symbol);
        }
        Ok(())
    }

    fn replace_cycles(&self, _snapshot: &SnapshotId, cycles: &[CycleReport]) -> Result<(), StorageError> {
        *self.cycles.lock().unwrap() = cycles.to_vec();
        Ok(())
    }

    fn load_snapshot(&self, snapshot: &SnapshotId) -> Result<Option<SnapshotFacts>, StorageError> {
        let facts = self.facts.lock().unwrap();
        Ok(facts.get(snapshot).map(|store| SnapshotFacts {
            symbols: store.symbols().cloned().collect(),
            dependencies: store.dependencies().cloned().collect(),
            calls: store.calls().cloned().collect(),
        }))
    }

    fn drop_snapshot(&self, snapshot: &SnapshotId) -> Result<(), StorageError> {
        self.facts.lock().unwrap().remove(snapshot);
        Ok(())
    }
}

#[test]
fn repository_receives_facts_metrics_and_cycles() {
    let repository = Arc::new(MemoryRepository::default());
    let engine = AnalysisEngine::default().with_repository(repository.clone());
    let s = snap();
    engine.submit_symbols(&s, (1..=2).map(func).collect()).unwrap();
    engine.submit_dependencies(&s, vec![dep(1, 2), dep(2, 1)]).unwrap();
    engine.submit_symbols(&s, vec![func(1)]).unwrap();
    engine.recompute(&s).unwrap();

    assert_eq!(repository.log.lock().unwrap().len(), 4);
    assert_eq!(repository.metrics.lock().unwrap().len(), 2);
    assert_eq!(repository.cycles.lock().unwrap().len(), 1);
}

#[test]
fn restored_snapshot_reproduces_metrics() {
    let repository = Arc::new(MemoryRepository::default());
    let s = snap();
    let original = AnalysisEngine::default().with_repository(repository.clone());
    original.submit_symbols(&s, (1..=3).map(func).collect()).unwrap();
    original.submit_dependencies(&s, vec![dep(1, 2), dep(2, 3)]).unwrap();
    original.submit_calls(&s, vec![call(1, 3).with_frequency(4)]).unwrap();
    original.recompute(&s).unwrap();

    let restored = AnalysisEngine::default().with_repository(repository);
    assert!(restored.restore_snapshot(&s).unwrap());
    restored.recompute(&s).unwrap();

    for id in 1..=3u64 {
        let a = original.get_metrics(&s, SymbolId(id)).unwrap();
        let b = restored.get_metrics(&s, SymbolId(id)).unwrap();
        assert!(a.same_values(&b), "symbol {id} differs");
    }
}

/// Delegates to a `MemoryRepository` but can be told to reject log appends.
#[derive(Default)]
struct FlakyRepository {
    inner: MemoryRepository,
    reject_appends: AtomicBool,
}

impl FactRepository for FlakyRepository {
    fn append_mutations(&self, snapshot: &SnapshotId, mutations: &[FactMutation]) -> Result<(), StorageError> {
        if self.reject_appends.load(Ordering::SeqCst) {
            return Err(StorageError::SqliteError {
                message: "disk I/O error".to_string(),
            });
        }
        self.inner.append_mutations(snapshot, mutations)
    }

    fn store_metrics(&self, snapshot: &SnapshotId, records: &[MetricsRecord]) -> Result<(), StorageError> {
        self.inner.store_metrics(snapshot, records)
    }

    fn remove_metrics(&self, snapshot: &SnapshotId, symbols: &[SymbolId]) -> Result<(), StorageError> {
        self.inner.remove_metrics(snapshot, symbols)
    }

    fn replace_cycles(&self, snapshot: &SnapshotId, cycles: &[CycleReport]) -> Result<(), StorageError> {
        self.inner.replace_cycles(snapshot, cycles)
    }

    fn load_snapshot(&self, snapshot: &SnapshotId) -> Result<Option<SnapshotFacts>, StorageError> {
        self.inner.load_snapshot(snapshot)
    }

    fn drop_snapshot(&self, snapshot: &SnapshotId) -> Result<(), StorageError> {
        self.inner.drop_snapshot(snapshot)
    }
}

#[test]
fn failed_log_append_leaves_the_snapshot_untouched() {
    let repository = Arc::new(FlakyRepository::default());
    let engine = AnalysisEngine::default().with_repository(repository.clone());
    let s = snap();
    engine.submit_symbols(&s, vec![func(1)]).unwrap();

    repository.reject_appends.store(true, Ordering::SeqCst);
    let err = engine.submit_symbols(&s, vec![func(2), func(3)]).unwrap_err();
    assert!(matches!(err, EngineError::Storage(_)), "got {err:?}");
    engine.recompute(&s).unwrap();
    assert!(matches!(
        engine.get_metrics(&s, SymbolId(2)),
        Err(EngineError::Query(QueryError::UnknownSymbol { .. }))
    ));
    assert!(engine.symbol_state(&s, SymbolId(3)).is_err());

    repository.reject_appends.store(false, Ordering::SeqCst);
    let summary = engine.submit_symbols(&s, vec![func(2), func(3)]).unwrap();
    assert_eq!(summary.inserted, 2);
    assert_eq!(repository.inner.log.lock().unwrap().len(), 3);
    engine.recompute(&s).unwrap();
    assert!(engine.get_metrics(&s, SymbolId(2)).is_ok());
}
