//! GraphIndex: read-only adjacency over one snapshot's facts.
//!
//! Dependency and call edges live in two petgraph `DiGraph`s that share node
//! indices, so a `NodeIndex` resolved once is valid for both families. Node
//! and edge insertion follow ascending key order, which makes every neighbor
//! iteration deterministic for a given fact set.

use std::sync::{Arc, OnceLock};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tangle_core::types::collections::FxHashMap;
use tangle_core::types::{SnapshotId, SymbolId};

use crate::facts::{CallEdge, DependencyEdge, EdgeType, Symbol};

use super::components::{compute_components, ComponentId, Components};

/// Immutable adjacency view. Edge weights are positions in the edge vectors.
pub struct GraphIndex {
    snapshot: SnapshotId,
    generation: u64,
    symbols: Vec<Arc<Symbol>>,
    nodes: FxHashMap<SymbolId, NodeIndex>,
    dependency_graph: DiGraph<SymbolId, usize>,
    call_graph: DiGraph<SymbolId, usize>,
    dependency_edges: Vec<DependencyEdge>,
    call_edges: Vec<CallEdge>,
    children: FxHashMap<SymbolId, Vec<SymbolId>>,
    components: OnceLock<Components>,
}

impl GraphIndex {
    /// `symbols` must arrive in ascending id order.
    pub fn build<'a>(
        snapshot: SnapshotId,
        generation: u64,
        symbols: impl Iterator<Item = Arc<Symbol>>,
        dependencies: impl Iterator<Item = &'a DependencyEdge>,
        calls: impl Iterator<Item = &'a CallEdge>,
    ) -> Self {
        let symbols: Vec<Arc<Symbol>> = symbols.collect();
        let mut dependency_graph = DiGraph::with_capacity(symbols.len(), 0);
        let mut call_graph = DiGraph::with_capacity(symbols.len(), 0);
        let mut nodes = FxHashMap::default();
        nodes.reserve(symbols.len());
        let mut children: FxHashMap<SymbolId, Vec<SymbolId>> = FxHashMap::default();

        for symbol in &symbols {
            let idx = dependency_graph.add_node(symbol.id);
            call_graph.add_node(symbol.id);
            nodes.insert(symbol.id, idx);
            if let Some(parent) = symbol.parent {
                children.entry(parent).or_default().push(symbol.id);
            }
        }

        let mut dependency_edges = Vec::new();
        for edge in dependencies {
            if let (Some(&s), Some(&t)) = (nodes.get(&edge.source), nodes.get(&edge.target)) {
                dependency_graph.add_edge(s, t, dependency_edges.len());
                dependency_edges.push(edge.clone());
            }
        }

        let mut call_edges = Vec::new();
        for edge in calls {
            if let (Some(&s), Some(&t)) = (nodes.get(&edge.caller), nodes.get(&edge.callee)) {
                call_graph.add_edge(s, t, call_edges.len());
                call_edges.push(edge.clone());
            }
        }

        tracing::debug!(
            snapshot = %snapshot,
            generation,
            symbols = symbols.len(),
            dependencies = dependency_edges.len(),
            calls = call_edges.len(),
            "graph index built"
        );

        Self {
            snapshot,
            generation,
            symbols,
            nodes,
            dependency_graph,
            call_graph,
            dependency_edges,
            call_edges,
            children,
            components: OnceLock::new(),
        }
    }

    pub fn snapshot(&self) -> &SnapshotId {
        &self.snapshot
    }

    /// Generation of the fact store this index was built from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn dependency_count(&self) -> usize {
        self.dependency_edges.len()
    }

    pub fn call_count(&self) -> usize {
        self.call_edges.len()
    }

    pub fn contains(&self, id: SymbolId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.nodes
            .get(&id)
            .map(|idx| self.symbols[idx.index()].as_ref())
    }

    /// All symbol ids in ascending order.
    pub fn symbol_ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols.iter().map(|s| s.id)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.symbols.iter().map(Arc::as_ref)
    }

    /// Targets of outgoing edges. Parallel edges yield the neighbor once per edge.
    pub fn neighbors_out(&self, id: SymbolId, edge_type: EdgeType) -> impl Iterator<Item = SymbolId> + '_ {
        self.neighbors(id, edge_type, Direction::Outgoing)
    }

    /// Sources of incoming edges.
    pub fn neighbors_in(&self, id: SymbolId, edge_type: EdgeType) -> impl Iterator<Item = SymbolId> + '_ {
        self.neighbors(id, edge_type, Direction::Incoming)
    }

    /// Distinct neighbors in ascending id order.
    pub fn distinct_neighbors(&self, id: SymbolId, edge_type: EdgeType, direction: Direction) -> Vec<SymbolId> {
        let mut out: Vec<SymbolId> = self.neighbors(id, edge_type, direction).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn dependencies_out(&self, id: SymbolId) -> impl Iterator<Item = &DependencyEdge> + '_ {
        self.edge_positions(id, EdgeType::Dependency, Direction::Outgoing)
            .map(|pos| &self.dependency_edges[pos])
    }

    pub fn dependencies_in(&self, id: SymbolId) -> impl Iterator<Item = &DependencyEdge> + '_ {
        self.edge_positions(id, EdgeType::Dependency, Direction::Incoming)
            .map(|pos| &self.dependency_edges[pos])
    }

    pub fn calls_out(&self, id: SymbolId) -> impl Iterator<Item = &CallEdge> + '_ {
        self.edge_positions(id, EdgeType::Call, Direction::Outgoing)
            .map(|pos| &self.call_edges[pos])
    }

    pub fn calls_in(&self, id: SymbolId) -> impl Iterator<Item = &CallEdge> + '_ {
        self.edge_positions(id, EdgeType::Call, Direction::Incoming)
            .map(|pos| &self.call_edges[pos])
    }

    pub fn all_dependencies(&self) -> &[DependencyEdge] {
        &self.dependency_edges
    }

    pub fn all_calls(&self) -> &[CallEdge] {
        &self.call_edges
    }

    /// Symbols declaring `id` as their parent scope, ascending.
    pub fn children(&self, id: SymbolId) -> &[SymbolId] {
        self.children.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Weakly connected component over both edge families.
    pub fn component_of(&self, id: SymbolId) -> Option<ComponentId> {
        self.components().of.get(&id).copied()
    }

    pub fn component_members(&self, component: ComponentId) -> &[SymbolId] {
        self.components()
            .members
            .get(&component)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn component_count(&self) -> usize {
        self.components().members.len()
    }

    fn components(&self) -> &Components {
        self.components.get_or_init(|| compute_components(self))
    }

    fn graph(&self, edge_type: EdgeType) -> &DiGraph<SymbolId, usize> {
        match edge_type {
            EdgeType::Dependency => &self.dependency_graph,
            EdgeType::Call => &self.call_graph,
        }
    }

    fn neighbors(
        &self,
        id: SymbolId,
        edge_type: EdgeType,
        direction: Direction,
    ) -> impl Iterator<Item = SymbolId> + '_ {
        let graph = self.graph(edge_type);
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(move |&idx| graph.neighbors_directed(idx, direction))
            .map(move |n| graph[n])
    }

    fn edge_positions(
        &self,
        id: SymbolId,
        edge_type: EdgeType,
        direction: Direction,
    ) -> impl Iterator<Item = usize> + '_ {
        let graph = self.graph(edge_type);
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(move |&idx| graph.edges_directed(idx, direction))
            .map(|e| *e.weight())
    }
}

impl std::fmt::Debug for GraphIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphIndex")
            .field("snapshot", &self.snapshot)
            .field("generation", &self.generation)
            .field("symbols", &self.symbols.len())
            .field("dependencies", &self.dependency_edges.len())
            .field("calls", &self.call_edges.len())
            .finish()
    }
}
