use std::collections::BTreeSet;

use proptest::prelude::*;
use tangle_analysis::cycles::{CycleDetector, CycleId, CycleKind};
use tangle_analysis::facts::{DependencyEdge, DependencyKind, FactStore, RawMetrics, Symbol, SymbolKind};
use tangle_analysis::metrics::maintainability::maintainability_index;
use tangle_analysis::metrics::{MetricsEngine, MetricsPolicy};
use tangle_core::types::SnapshotId;

fn store_with(nodes: u64, edges: &[(u64, u64, u32)]) -> FactStore {
    let mut store = FactStore::new(SnapshotId::from("prop"));
    for id in 0..nodes {
        store
            .upsert_symbol(Symbol::new(id, format!("s{id}"), SymbolKind::Module))
            .unwrap();
    }
    for &(source, target, line) in edges {
        store
            .upsert_dependency(DependencyEdge::new(source, target, DependencyKind::Import).at_line(line))
            .unwrap();
    }
    store
}

fn graph() -> impl Strategy<Value = (u64, Vec<(u64, u64, u32)>)> {
    (1u64..24).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n, 0u32..3), 0..80)))
}

proptest! {
    #[test]
    fn coupling_and_instability_stay_in_unit_interval((nodes, edges) in graph()) {
        let index = store_with(nodes, &edges).build_index();
        let batch = MetricsEngine::new(MetricsPolicy::default()).compute_all(&index);
        prop_assert_eq!(batch.results.len() as u64, nodes);
        for result in &batch.results {
            let r = &result.record;
            prop_assert!((0.0..=1.0).contains(&r.coupling_factor), "coupling {}", r.coupling_factor);
            prop_assert!((0.0..=1.0).contains(&r.instability), "instability {}", r.instability);
            prop_assert!(r.distance_from_main.is_finite());
        }
    }

    #[test]
    fn fan_counts_ignore_parallel_edges((nodes, edges) in graph()) {
        let index = store_with(nodes, &edges).build_index();
        let batch = MetricsEngine::new(MetricsPolicy::default()).compute_all(&index);
        for result in &batch.results {
            let id = result.record.symbol.get();
            let outs: BTreeSet<u64> = edges.iter().filter(|e| e.0 == id).map(|e| e.1).collect();
            let ins: BTreeSet<u64> = edges.iter().filter(|e| e.1 == id).map(|e| e.0).collect();
            prop_assert_eq!(result.record.fan_out as usize, outs.len());
            prop_assert_eq!(result.record.fan_in as usize, ins.len());
        }
    }

    #[test]
    fn ring_id_is_independent_of_insertion_order(
        order in Just((0u64..6).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let mut store = FactStore::new(SnapshotId::from("ring"));
        for id in 0..6u64 {
            store.upsert_symbol(Symbol::new(id, format!("r{id}"), SymbolKind::Module)).unwrap();
        }
        for &from in &order {
            store
                .upsert_dependency(DependencyEdge::new(from, (from + 1) % 6, DependencyKind::Import))
                .unwrap();
        }
        let outcome = CycleDetector::new(50).detect_all(&store.build_index());
        prop_assert_eq!(outcome.cycles.len(), 1);
        let cycle = &outcome.cycles[0];
        prop_assert_eq!(cycle.kind, CycleKind::Dependency);
        prop_assert_eq!(cycle.members.iter().map(|m| m.get()).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
        prop_assert_eq!(cycle.id, CycleId::of(CycleKind::Dependency, &cycle.members));
    }

    #[test]
    fn maintainability_is_clamped(cc in 0u32..500, volume in 0.0f64..1e7, loc in 0u32..100_000) {
        let raw = RawMetrics::complete(cc, volume, loc);
        let mi = maintainability_index(&raw, 0.0).unwrap();
        prop_assert!(mi.is_finite());
        prop_assert!((0.0..=100.0).contains(&mi));
    }
}
