//! Call chains (outgoing) and call hierarchies (incoming).
//!
//! Every simple path from the root up to the depth bound is emitted, not just
//! maximal ones. A call back into the current path produces one circular
//! path and is not extended further.

use tangle_core::errors::TraversalError;
use tangle_core::types::collections::{BTreeMap, FxHashSet};
use tangle_core::types::SymbolId;

use super::types::{CallChain, CallPath, TraversalDirection};
use crate::graph::GraphIndex;

/// Limits applied to a single chain query.
#[derive(Debug, Clone, Copy)]
pub struct ChainLimits {
    pub max_depth: u32,
    pub max_paths: usize,
}

struct Frame {
    node: SymbolId,
    probability: f64,
    /// (neighbor, edge probability), ascending by neighbor.
    edges: Vec<(SymbolId, f64)>,
    next: usize,
}

/// Callees reachable from `root`.
pub fn call_chain(index: &GraphIndex, root: SymbolId, limits: ChainLimits) -> CallChain {
    enumerate(index, root, TraversalDirection::Callees, limits)
}

/// Callers that reach `target`. Each path is reported in call order, ending at `target`.
pub fn call_hierarchy(index: &GraphIndex, target: SymbolId, limits: ChainLimits) -> CallChain {
    let mut chain = enumerate(index, target, TraversalDirection::Callers, limits);
    for path in &mut chain.paths {
        path.symbols.reverse();
    }
    chain
}

/// Parallel call sites between the same pair collapse into one step carrying
/// the highest execution probability.
fn step_edges(index: &GraphIndex, node: SymbolId, direction: TraversalDirection) -> Vec<(SymbolId, f64)> {
    let mut best: BTreeMap<SymbolId, f64> = BTreeMap::new();
    let mut record = |neighbor: SymbolId, p: f64| {
        let slot = best.entry(neighbor).or_insert(p);
        if p > *slot {
            *slot = p;
        }
    };
    match direction {
        TraversalDirection::Callees => {
            for edge in index.calls_out(node) {
                record(edge.callee, edge.execution_probability);
            }
        }
        TraversalDirection::Callers => {
            for edge in index.calls_in(node) {
                record(edge.caller, edge.execution_probability);
            }
        }
    }
    best.into_iter().collect()
}

fn enumerate(index: &GraphIndex, root: SymbolId, direction: TraversalDirection, limits: ChainLimits) -> CallChain {
    let mut chain = CallChain {
        root: Some(root),
        ..Default::default()
    };
    if !index.contains(root) {
        return chain;
    }

    let max_depth = limits.max_depth.max(1) as usize;
    let mut on_path: FxHashSet<SymbolId> = FxHashSet::default();
    on_path.insert(root);
    let mut stack = vec![Frame {
        node: root,
        probability: 1.0,
        edges: step_edges(index, root, direction),
        next: 0,
    }];
    let mut depth_hit = false;

    loop {
        let step = match stack.last_mut() {
            None => break,
            Some(frame) if frame.next < frame.edges.len() => {
                let (neighbor, p) = frame.edges[frame.next];
                frame.next += 1;
                Some((neighbor, frame.probability * p))
            }
            Some(_) => None,
        };
        let Some((neighbor, probability)) = step else {
            if let Some(done) = stack.pop() {
                on_path.remove(&done.node);
            }
            continue;
        };

        let mut symbols: Vec<SymbolId> = stack.iter().map(|f| f.node).collect();
        symbols.push(neighbor);
        let is_circular = on_path.contains(&neighbor);
        chain.paths.push(CallPath {
            length: symbols.len() - 1,
            symbols,
            probability,
            is_circular,
        });

        if chain.paths.len() >= limits.max_paths {
            chain.diagnostics.push(TraversalError::PathLimitExceeded {
                start: root,
                limit: limits.max_paths,
            });
            tracing::debug!(start = %root, limit = limits.max_paths, "call path enumeration capped");
            break;
        }
        if is_circular {
            continue;
        }

        let edges = step_edges(index, neighbor, direction);
        // stack.len() edges are already on the path including this one
        if stack.len() >= max_depth {
            if !edges.is_empty() {
                depth_hit = true;
            }
            continue;
        }
        on_path.insert(neighbor);
        stack.push(Frame {
            node: neighbor,
            probability,
            edges,
            next: 0,
        });
    }

    if depth_hit {
        chain.diagnostics.push(TraversalError::DepthLimitExceeded {
            start: root,
            limit: limits.max_depth,
        });
    }
    chain
}
