//! Weakly connected components over the union of dependency and call edges.
//!
//! Components are the unit of scheduling for incremental recomputation: two
//! symbols in different components never share a cycle or a dependency path.

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use tangle_core::types::collections::FxHashMap;
use tangle_core::types::SymbolId;

use super::GraphIndex;

/// Identified by the lowest symbol id among its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub SymbolId);

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "component:{}", self.0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Components {
    pub(crate) of: FxHashMap<SymbolId, ComponentId>,
    /// Members in ascending id order.
    pub(crate) members: FxHashMap<ComponentId, Vec<SymbolId>>,
}

pub(crate) fn compute_components(index: &GraphIndex) -> Components {
    let ids: Vec<SymbolId> = index.symbol_ids().collect();
    let position: FxHashMap<SymbolId, usize> =
        ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut sets = UnionFind::<usize>::new(ids.len());
    let dependency_pairs = index.all_dependencies().iter().map(|e| (e.source, e.target));
    let call_pairs = index.all_calls().iter().map(|e| (e.caller, e.callee));
    for (a, b) in dependency_pairs.chain(call_pairs) {
        if let (Some(&x), Some(&y)) = (position.get(&a), position.get(&b)) {
            sets.union(x, y);
        }
    }

    // ids are ascending, so the first member seen for a root is the lowest
    let mut root_component: FxHashMap<usize, ComponentId> = FxHashMap::default();
    let mut components = Components::default();
    for (i, id) in ids.iter().enumerate() {
        let component = *root_component
            .entry(sets.find(i))
            .or_insert(ComponentId(*id));
        components.of.insert(*id, component);
        components.members.entry(component).or_default().push(*id);
    }
    components
}
