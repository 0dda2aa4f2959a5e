//! Dependency depth: longest acyclic dependency path leaving a symbol,
//! bounded by the traversal depth limit.
//!
//! Back edges (to a symbol already on the current path) are ignored. Results
//! are memoized together with the budget they were computed under, so a
//! value truncated at a small remaining budget is never reused where a
//! larger budget would see further.

use tangle_core::errors::TraversalError;
use tangle_core::types::collections::{FxHashMap, FxHashSet};
use tangle_core::types::SymbolId;

use crate::facts::EdgeType;
use crate::graph::GraphIndex;

#[derive(Debug, Clone, Copy)]
enum Memo {
    /// Full longest path, not truncated anywhere below.
    Exact(u32),
    /// Truncated: the true depth is at least this budget.
    AtLeast(u32),
}

impl Memo {
    /// `(depth, truncated)` under `budget`, or `None` if it must be recomputed.
    fn under(self, budget: u32) -> Option<(u32, bool)> {
        match self {
            Memo::Exact(v) => Some((v.min(budget), v > budget)),
            Memo::AtLeast(b) if budget <= b => Some((budget, true)),
            Memo::AtLeast(_) => None,
        }
    }
}

struct Frame {
    node: SymbolId,
    budget: u32,
    neighbors: Vec<SymbolId>,
    next: usize,
    best: u32,
    truncated: bool,
}

/// Shared memo for a batch of depth queries over one index.
pub struct DepthCalculator<'a> {
    index: &'a GraphIndex,
    max_depth: u32,
    memo: FxHashMap<SymbolId, Memo>,
}

impl<'a> DepthCalculator<'a> {
    pub fn new(index: &'a GraphIndex, max_depth: u32) -> Self {
        Self {
            index,
            max_depth,
            memo: FxHashMap::default(),
        }
    }

    /// Depth of `symbol`, plus a diagnostic when the bound cut exploration short.
    pub fn depth(&mut self, symbol: SymbolId) -> (u32, Option<TraversalError>) {
        let (depth, truncated) = self.compute(symbol, self.max_depth);
        let diagnostic = truncated.then_some(TraversalError::DepthLimitExceeded {
            start: symbol,
            limit: self.max_depth,
        });
        (depth, diagnostic)
    }

    fn frame(&self, node: SymbolId, budget: u32) -> Frame {
        let mut neighbors: Vec<SymbolId> = self.index.neighbors_out(node, EdgeType::Dependency).collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        Frame {
            node,
            budget,
            neighbors,
            next: 0,
            best: 0,
            truncated: false,
        }
    }

    fn compute(&mut self, root: SymbolId, budget: u32) -> (u32, bool) {
        if let Some(hit) = self.memo.get(&root).and_then(|m| m.under(budget)) {
            return hit;
        }

        let mut on_path: FxHashSet<SymbolId> = FxHashSet::default();
        on_path.insert(root);
        let mut stack = vec![self.frame(root, budget)];

        while let Some(top) = stack.last_mut() {
            if top.next < top.neighbors.len() {
                let child = top.neighbors[top.next];
                top.next += 1;
                if on_path.contains(&child) {
                    continue;
                }
                if top.budget == 0 {
                    top.truncated = true;
                    continue;
                }
                let child_budget = top.budget - 1;
                if let Some((value, truncated)) = self.memo.get(&child).and_then(|m| m.under(child_budget)) {
                    top.best = top.best.max(value + 1);
                    top.truncated |= truncated;
                    continue;
                }
                let frame = self.frame(child, child_budget);
                on_path.insert(child);
                stack.push(frame);
                continue;
            }

            let Some(done) = stack.pop() else { break };
            on_path.remove(&done.node);
            let memo = if done.truncated {
                Memo::AtLeast(done.budget)
            } else {
                Memo::Exact(done.best)
            };
            self.memo.insert(done.node, memo);

            match stack.last_mut() {
                Some(parent) => {
                    parent.best = parent.best.max(done.best + 1);
                    parent.truncated |= done.truncated;
                }
                None => return (done.best, done.truncated),
            }
        }
        (0, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{DependencyEdge, DependencyKind, FactStore, Symbol, SymbolKind};
    use tangle_core::types::SnapshotId;

    fn chain(n: u64, back_edge: bool) -> GraphIndex {
        let mut store = FactStore::new(SnapshotId::from("depth"));
        for id in 0..n {
            store.upsert_symbol(Symbol::new(id, format!("s{id}"), SymbolKind::Module)).unwrap();
        }
        for id in 0..n - 1 {
            store
                .upsert_dependency(DependencyEdge::new(id, id + 1, DependencyKind::Import))
                .unwrap();
        }
        if back_edge {
            store
                .upsert_dependency(DependencyEdge::new(n - 1, 0u64, DependencyKind::Import))
                .unwrap();
        }
        store.build_index()
    }

    #[test]
    fn short_chain_is_exact() {
        let index = chain(4, false);
        let mut calc = DepthCalculator::new(&index, 50);
        assert_eq!(calc.depth(SymbolId(0)), (3, None));
        assert_eq!(calc.depth(SymbolId(2)), (1, None));
        assert_eq!(calc.depth(SymbolId(3)), (0, None));
    }

    #[test]
    fn back_edges_are_ignored() {
        let index = chain(4, true);
        let mut calc = DepthCalculator::new(&index, 50);
        assert_eq!(calc.depth(SymbolId(0)).0, 3);
    }

    #[test]
    fn long_chain_is_capped_for_every_symbol() {
        let index = chain(200, false);
        let mut calc = DepthCalculator::new(&index, 50);
        for id in [0u64, 1, 100, 148] {
            let (depth, diagnostic) = calc.depth(SymbolId(id));
            assert_eq!(depth, 50, "symbol {id}");
            assert!(diagnostic.is_some());
        }
        assert_eq!(calc.depth(SymbolId(149)), (50, None));
        assert_eq!(calc.depth(SymbolId(150)), (49, None));
    }
}
