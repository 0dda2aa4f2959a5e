//! SQLite persistence: schema, fact log, current state, and an engine
//! round-trip through a file database.

use std::sync::Arc;

use tangle_analysis::cycles::{CycleKind, CycleSeverity};
use tangle_analysis::facts::{CallEdge, DependencyEdge, DependencyKind, FactMutation, RawMetrics, Symbol, SymbolKind};
use tangle_analysis::repository::FactRepository;
use tangle_analysis::AnalysisEngine;
use tangle_core::config::{StorageConfig, TangleConfig};
use tangle_core::types::{SnapshotId, SymbolId};
use tangle_storage::connection::pragmas::journal_mode;
use tangle_storage::migrations::{current_version, run_migrations, LATEST_VERSION};
use tangle_storage::queries::{facts, metrics};
use tangle_storage::{DatabaseManager, SqliteFactRepository};

fn snap() -> SnapshotId {
    SnapshotId::from("main@1")
}

fn module(id: u64) -> Symbol {
    Symbol::new(id, format!("m{id}"), SymbolKind::Module).with_raw_metrics(RawMetrics::complete(2, 80.0, 12))
}

fn dep(source: u64, target: u64) -> DependencyEdge {
    DependencyEdge::new(source, target, DependencyKind::Import)
}

// ═══════════════════════════════════════════════════════════════════════════
// SCHEMA
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn migrations_reach_latest_version_once() {
    let db = DatabaseManager::open_in_memory().unwrap();
    db.with_writer(|conn| {
        assert_eq!(current_version(conn)?, LATEST_VERSION);
        assert_eq!(run_migrations(conn)?, 0);
        Ok(())
    })
    .unwrap();
}

#[test]
fn file_database_uses_wal() {
    let dir = tempfile::tempdir().unwrap();
    let db = DatabaseManager::open(&dir.path().join("tangle.db")).unwrap();
    let mode = db.with_writer(journal_mode).unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
    db.checkpoint().unwrap();
    assert!(db.path().is_some());
}

// ═══════════════════════════════════════════════════════════════════════════
// FACT LOG AND CURRENT STATE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn log_and_current_state_follow_mutations() {
    let repo = SqliteFactRepository::open_in_memory().unwrap();
    let s = snap();
    assert!(repo.load_snapshot(&s).unwrap().is_none());

    let mutations = vec![
        FactMutation::UpsertSymbol(module(1)),
        FactMutation::UpsertSymbol(module(2)),
        FactMutation::UpsertSymbol(module(3)),
        FactMutation::UpsertDependency(dep(1, 2)),
        FactMutation::UpsertDependency(dep(2, 3)),
        FactMutation::UpsertCall(CallEdge::new(1u64, 3u64).with_frequency(2)),
    ];
    repo.append_mutations(&s, &mutations).unwrap();

    let loaded = repo.load_snapshot(&s).unwrap().unwrap();
    assert_eq!(loaded.symbols.len(), 3);
    assert_eq!(loaded.dependencies, vec![dep(1, 2), dep(2, 3)]);
    assert_eq!(loaded.calls[0].frequency, 2);
    assert_eq!(repo.fact_log(&s).unwrap(), mutations);
}

#[test]
fn removing_a_symbol_cascades_to_its_edges_but_keeps_the_log() {
    let repo = SqliteFactRepository::open_in_memory().unwrap();
    let s = snap();
    repo.append_mutations(
        &s,
        &[
            FactMutation::UpsertSymbol(module(1)),
            FactMutation::UpsertSymbol(module(2)),
            FactMutation::UpsertDependency(dep(1, 2)),
            FactMutation::UpsertCall(CallEdge::new(2u64, 1u64)),
        ],
    )
    .unwrap();
    repo.append_mutations(&s, &[FactMutation::RemoveSymbol(SymbolId(2))]).unwrap();

    let loaded = repo.load_snapshot(&s).unwrap().unwrap();
    assert_eq!(loaded.symbols.iter().map(|s| s.id).collect::<Vec<_>>(), vec![SymbolId(1)]);
    assert!(loaded.dependencies.is_empty());
    assert!(loaded.calls.is_empty());

    let log_len = repo.database().with_writer(|conn| facts::log_len(conn, &s)).unwrap();
    assert_eq!(log_len, 5);
}

#[test]
fn removing_a_dependency_key_deletes_only_that_row() {
    let repo = SqliteFactRepository::open_in_memory().unwrap();
    let s = snap();
    let at_ten = dep(1, 2).at_line(10);
    repo.append_mutations(
        &s,
        &[
            FactMutation::UpsertSymbol(module(1)),
            FactMutation::UpsertSymbol(module(2)),
            FactMutation::UpsertDependency(dep(1, 2)),
            FactMutation::UpsertDependency(at_ten.clone()),
        ],
    )
    .unwrap();
    repo.append_mutations(&s, &[FactMutation::RemoveDependency(dep(1, 2).key())]).unwrap();

    let loaded = repo.load_snapshot(&s).unwrap().unwrap();
    assert_eq!(loaded.dependencies, vec![at_ten]);
}

#[test]
fn snapshots_do_not_share_rows() {
    let repo = SqliteFactRepository::open_in_memory().unwrap();
    let a = SnapshotId::from("a");
    let b = SnapshotId::from("b");
    repo.append_mutations(&a, &[FactMutation::UpsertSymbol(module(1))]).unwrap();
    repo.append_mutations(&b, &[FactMutation::UpsertSymbol(module(1)), FactMutation::UpsertSymbol(module(2))])
        .unwrap();

    repo.drop_snapshot(&a).unwrap();
    assert!(repo.load_snapshot(&a).unwrap().is_none());
    assert_eq!(repo.load_snapshot(&b).unwrap().unwrap().symbols.len(), 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// ENGINE WRITE-THROUGH
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn engine_persists_metrics_and_cycles() {
    let repo = Arc::new(SqliteFactRepository::open_in_memory().unwrap());
    let s = snap();
    let engine = AnalysisEngine::default().with_repository(repo.clone());
    engine.submit_symbols(&s, (1..=3).map(module).collect()).unwrap();
    engine.submit_dependencies(&s, vec![dep(1, 2), dep(2, 1), dep(2, 3)]).unwrap();
    engine.recompute(&s).unwrap();

    let stored = repo.load_metrics(&s, SymbolId(2)).unwrap().unwrap();
    assert_eq!(stored.fan_out, 2);
    let live = engine.get_metrics(&s, SymbolId(2)).unwrap();
    assert_eq!(stored.revision, live.revision);
    assert_eq!(stored.fan_in, live.fan_in);
    assert!((stored.instability - live.instability).abs() < 1e-12);
    let count = repo.database().with_writer(|conn| metrics::count_metrics(conn, &s)).unwrap();
    assert_eq!(count, 3);

    let cycles = repo.load_cycles(&s).unwrap();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].kind, CycleKind::Dependency);
    assert_eq!(cycles[0].members, vec![SymbolId(1), SymbolId(2)]);

    engine
        .remove_dependencies(&s, &[dep(2, 1).key()])
        .unwrap();
    engine.recompute(&s).unwrap();
    assert!(repo.load_cycles(&s).unwrap().is_empty());

    engine.remove_symbols(&s, &[SymbolId(3)]).unwrap();
    engine.recompute(&s).unwrap();
    assert!(repo.load_metrics(&s, SymbolId(3)).unwrap().is_none());
}

#[test]
fn persist_metrics_can_be_disabled() {
    let config = TangleConfig {
        storage: StorageConfig {
            database_path: None,
            persist_metrics: Some(false),
        },
        ..Default::default()
    };
    let repo = Arc::new(SqliteFactRepository::from_config(&config.storage).unwrap());
    let s = snap();
    let engine = AnalysisEngine::from_config(&config).with_repository(repo.clone());
    engine.submit_symbols(&s, vec![module(1)]).unwrap();
    engine.recompute(&s).unwrap();

    assert!(repo.load_metrics(&s, SymbolId(1)).unwrap().is_none());
    assert_eq!(repo.load_snapshot(&s).unwrap().unwrap().symbols.len(), 1);
}

#[test]
fn file_backed_snapshot_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tangle.db");
    let s = snap();

    let first = AnalysisEngine::default().with_repository(Arc::new(SqliteFactRepository::open(&path).unwrap()));
    first.submit_symbols(&s, (1..=4).map(module).collect()).unwrap();
    first
        .submit_dependencies(&s, vec![dep(1, 2), dep(2, 3), dep(3, 1), dep(3, 4)])
        .unwrap();
    first.submit_calls(&s, vec![CallEdge::new(1u64, 4u64).with_frequency(3)]).unwrap();
    first.recompute(&s).unwrap();
    let before: Vec<_> = (1..=4u64).map(|id| first.get_metrics(&s, SymbolId(id)).unwrap()).collect();
    drop(first);

    let repo = Arc::new(SqliteFactRepository::open(&path).unwrap());
    let second = AnalysisEngine::default().with_repository(repo);
    assert!(second.restore_snapshot(&s).unwrap());
    second.recompute(&s).unwrap();

    for record in before {
        let after = second.get_metrics(&s, record.symbol).unwrap();
        assert!(record.same_values(&after), "symbol {} differs", record.symbol);
    }
    assert_eq!(second.list_cycles(&s, CycleSeverity::Low).unwrap().len(), 1);
}
