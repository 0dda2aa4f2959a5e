//! Bounded cycle search over one edge family.
//!
//! Iterative DFS with an explicit stack and an on-path set. Roots are visited
//! in ascending id order and neighbors in ascending id order, so the reported
//! set is deterministic for a given graph.
//!
//! A node is finished only when its whole subtree was explored without
//! hitting the depth bound; finished nodes are never entered again. A node
//! whose subtree was truncated may be re-entered by any later walk that
//! reaches it at a shallower depth, so each node is pushed at most
//! `max_depth + 1` times over the whole search.

use tangle_core::errors::TraversalError;
use tangle_core::types::collections::{BTreeMap, FxHashMap, FxHashSet, SmallVec8};
use tangle_core::types::SymbolId;

use super::types::{canonicalize, BreakSuggestion, CycleId, CycleKind, CycleReport, CycleSeverity, RecursionKind};
use crate::facts::EdgeType;
use crate::graph::GraphIndex;

/// Cycles found by a detection run plus the traversal diagnostics it raised.
#[derive(Debug, Clone, Default)]
pub struct DetectionOutcome {
    pub cycles: Vec<CycleReport>,
    pub diagnostics: Vec<TraversalError>,
}

impl DetectionOutcome {
    fn merge(&mut self, other: DetectionOutcome) {
        self.cycles.extend(other.cycles);
        self.diagnostics.extend(other.diagnostics);
    }

    fn finish(mut self) -> Self {
        let mut seen = FxHashSet::default();
        self.cycles.retain(|c| seen.insert(c.id));
        self.cycles.sort_by(|a, b| a.members.cmp(&b.members).then(a.id.cmp(&b.id)));
        self
    }
}

/// Finds dependency cycles and call recursion within a depth bound.
#[derive(Debug, Clone, Copy)]
pub struct CycleDetector {
    max_depth: u32,
}

impl CycleDetector {
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Full-graph detection: dependency cycles and call recursion.
    pub fn detect_all(&self, index: &GraphIndex) -> DetectionOutcome {
        let roots: Vec<SymbolId> = index.symbol_ids().collect();
        self.detect_from(index, &roots)
    }

    /// Detection restricted to what is reachable from `roots`.
    ///
    /// Passing every member of a weakly connected component finds every cycle
    /// in that component, since cycles never cross component boundaries.
    pub fn detect_from(&self, index: &GraphIndex, roots: &[SymbolId]) -> DetectionOutcome {
        let mut outcome = self.dependency_cycles(index, roots);
        outcome.merge(self.recursion(index, roots));
        outcome.finish()
    }

    pub fn dependency_cycles(&self, index: &GraphIndex, roots: &[SymbolId]) -> DetectionOutcome {
        let search = bounded_cycle_search(index, EdgeType::Dependency, roots, self.max_depth, false);
        let cycles = search
            .cycles
            .into_iter()
            .map(|members| build_report(index, CycleKind::Dependency, members))
            .collect();
        DetectionOutcome {
            cycles,
            diagnostics: search.diagnostics,
        }
        .finish()
    }

    /// Call recursion: direct self-calls first, then longer loops.
    pub fn recursion(&self, index: &GraphIndex, roots: &[SymbolId]) -> DetectionOutcome {
        let mut cycles = Vec::new();
        for &root in roots {
            if index.neighbors_out(root, EdgeType::Call).any(|callee| callee == root) {
                cycles.push(build_report(
                    index,
                    CycleKind::Recursion(RecursionKind::Direct),
                    vec![root],
                ));
            }
        }

        let search = bounded_cycle_search(index, EdgeType::Call, roots, self.max_depth, true);
        cycles.extend(search.cycles.into_iter().map(|members| {
            let kind = CycleKind::Recursion(RecursionKind::for_length(members.len()));
            build_report(index, kind, members)
        }));

        DetectionOutcome {
            cycles,
            diagnostics: search.diagnostics,
        }
        .finish()
    }
}

struct SearchResult {
    /// Canonical member lists, deduplicated.
    cycles: Vec<Vec<SymbolId>>,
    diagnostics: Vec<TraversalError>,
}

struct Frame {
    node: SymbolId,
    neighbors: SmallVec8<SymbolId>,
    next: usize,
    /// Some path below this node was cut at the depth bound.
    truncated: bool,
}

impl Frame {
    fn new(index: &GraphIndex, node: SymbolId, edge_type: EdgeType) -> Self {
        let mut neighbors: SmallVec8<SymbolId> = index.neighbors_out(node, edge_type).collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        Self {
            node,
            neighbors,
            next: 0,
            truncated: false,
        }
    }
}

fn bounded_cycle_search(
    index: &GraphIndex,
    edge_type: EdgeType,
    roots: &[SymbolId],
    max_depth: u32,
    skip_self_loops: bool,
) -> SearchResult {
    let mut sorted_roots: Vec<SymbolId> = roots.iter().copied().filter(|r| index.contains(*r)).collect();
    sorted_roots.sort_unstable();
    sorted_roots.dedup();

    let mut found: BTreeMap<Vec<SymbolId>, ()> = BTreeMap::new();
    let mut diagnostics = Vec::new();
    let mut finished: FxHashSet<SymbolId> = FxHashSet::default();
    // Shallowest depth each unfinished node has been entered at.
    let mut shallowest: FxHashMap<SymbolId, usize> = FxHashMap::default();

    for root in sorted_roots {
        if finished.contains(&root) || shallowest.get(&root) == Some(&0) {
            continue;
        }
        let mut depth_hit = false;
        let mut on_path: FxHashMap<SymbolId, usize> = FxHashMap::default();
        let mut stack = vec![Frame::new(index, root, edge_type)];
        shallowest.insert(root, 0);
        on_path.insert(root, 0);

        loop {
            let step = match stack.last_mut() {
                None => break,
                Some(frame) if frame.next < frame.neighbors.len() => {
                    let next = frame.neighbors[frame.next];
                    frame.next += 1;
                    Some((frame.node, next))
                }
                Some(_) => None,
            };

            let Some((current, next)) = step else {
                if let Some(done) = stack.pop() {
                    on_path.remove(&done.node);
                    if done.truncated {
                        if let Some(parent) = stack.last_mut() {
                            parent.truncated = true;
                        }
                    } else {
                        finished.insert(done.node);
                        shallowest.remove(&done.node);
                    }
                }
                continue;
            };

            if next == current && skip_self_loops {
                continue;
            }
            if let Some(&position) = on_path.get(&next) {
                let members: Vec<SymbolId> = stack[position..].iter().map(|f| f.node).collect();
                found.insert(canonicalize(&members), ());
                continue;
            }
            if finished.contains(&next) {
                continue;
            }
            // stack.len() nodes means stack.len() - 1 edges; pushing adds one more.
            let depth = stack.len();
            let explored_shallower = shallowest.get(&next).is_some_and(|&d| d <= depth);
            if explored_shallower || depth > max_depth as usize {
                if let Some(frame) = stack.last_mut() {
                    frame.truncated = true;
                }
                depth_hit |= !explored_shallower;
                continue;
            }
            shallowest.insert(next, depth);
            on_path.insert(next, depth);
            stack.push(Frame::new(index, next, edge_type));
        }

        if depth_hit {
            tracing::debug!(
                start = %root,
                limit = max_depth,
                edge_type = edge_type.name(),
                "cycle search truncated at depth limit"
            );
            diagnostics.push(TraversalError::DepthLimitExceeded {
                start: root,
                limit: max_depth,
            });
        }
    }

    SearchResult {
        cycles: found.into_keys().collect(),
        diagnostics,
    }
}

fn build_report(index: &GraphIndex, kind: CycleKind, members: Vec<SymbolId>) -> CycleReport {
    let members = canonicalize(&members);
    let length = members.len();
    let id = CycleId::of(kind, &members);
    let mut report = CycleReport {
        id,
        kind,
        length,
        severity: CycleSeverity::classify(kind, length),
        members,
        break_suggestions: Vec::new(),
    };
    report.break_suggestions = suggest_breaks(index, &report);
    report
}

/// Rank the cycle's edges by strength, weakest first.
///
/// Dependency strength is `confidence * weight` summed over parallel edges;
/// call strength is `frequency * execution_probability`.
fn suggest_breaks(index: &GraphIndex, report: &CycleReport) -> Vec<BreakSuggestion> {
    let mut suggestions: Vec<BreakSuggestion> = report
        .edges()
        .map(|(from, to)| {
            let impact = match report.kind {
                CycleKind::Dependency => index
                    .dependencies_out(from)
                    .filter(|e| e.target == to)
                    .map(|e| e.confidence * e.weight)
                    .sum(),
                CycleKind::Recursion(_) => index
                    .calls_out(from)
                    .filter(|e| e.callee == to)
                    .map(|e| e.frequency as f64 * e.execution_probability)
                    .sum(),
            };
            BreakSuggestion { from, to, impact }
        })
        .collect();
    suggestions.sort_by(|a, b| {
        a.impact
            .total_cmp(&b.impact)
            .then(a.from.cmp(&b.from))
            .then(a.to.cmp(&b.to))
    });
    suggestions
}
