//! RecomputeController: tracks which symbols need new metrics and which
//! components need cycle re-detection.
//!
//! Fact changes arrive as seeds. Seeds are expanded against the next index
//! build: each seed plus its transitive dependency predecessors (whose
//! `dependency_depth` may change) becomes Dirty, and the seed's component is
//! scheduled for cycle re-detection. Seeds that no longer exist in the index
//! are reported as removed so their records can be dropped.

use tangle_core::types::collections::{BTreeMap, BTreeSet, FxHashMap, FxHashSet};
use tangle_core::types::SymbolId;

use super::state::RecomputeState;
use crate::facts::{EdgeType, FactChange, FactMutation};
use crate::graph::{ComponentId, GraphIndex};

/// Work for one connected component in one scheduler pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentWork {
    pub component: ComponentId,
    /// Dirty symbols to recompute, ascending.
    pub symbols: Vec<SymbolId>,
    pub redetect_cycles: bool,
}

#[derive(Debug, Default)]
pub struct RecomputeController {
    states: FxHashMap<SymbolId, RecomputeState>,
    dirty: BTreeSet<SymbolId>,
    seeds: BTreeSet<SymbolId>,
    cycle_seeds: BTreeSet<SymbolId>,
    removed: BTreeSet<SymbolId>,
    full: bool,
}

impl RecomputeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an applied fact change.
    pub fn record(&mut self, change: &FactChange) {
        if !change.is_effective() {
            return;
        }
        if let FactMutation::RemoveSymbol(id) = change.mutation {
            self.removed.insert(id);
        }
        for &id in &change.touched {
            self.seeds.insert(id);
            self.cycle_seeds.insert(id);
            self.set_state(id, RecomputeState::Dirty);
        }
    }

    /// Schedule every symbol and every component on the next expansion.
    pub fn mark_all(&mut self) {
        self.full = true;
    }

    pub fn state(&self, id: SymbolId) -> RecomputeState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len() + self.seeds.iter().filter(|s| !self.dirty.contains(s)).count()
    }

    pub fn dirty_symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.dirty.iter().copied()
    }

    pub fn has_pending_work(&self) -> bool {
        self.full
            || !self.dirty.is_empty()
            || !self.seeds.is_empty()
            || !self.cycle_seeds.is_empty()
            || !self.removed.is_empty()
    }

    /// Resolve seeds against a freshly built index.
    pub fn expand(&mut self, index: &GraphIndex, max_depth: u32) {
        if self.full {
            self.full = false;
            self.seeds.extend(index.symbol_ids());
            self.cycle_seeds.extend(index.symbol_ids());
        }

        let seeds = std::mem::take(&mut self.seeds);
        let mut frontier: Vec<SymbolId> = Vec::new();
        for seed in seeds {
            if !index.contains(seed) {
                self.removed.insert(seed);
                self.states.remove(&seed);
                continue;
            }
            if self.dirty.insert(seed) {
                frontier.push(seed);
            }
        }

        // Predecessors at most `max_depth` hops away can see a new depth.
        let mut level = 0;
        while !frontier.is_empty() && level < max_depth {
            let mut next = Vec::new();
            for id in frontier {
                for pred in index.neighbors_in(id, EdgeType::Dependency) {
                    if self.dirty.insert(pred) {
                        next.push(pred);
                    }
                }
            }
            frontier = next;
            level += 1;
        }

        self.dirty.retain(|id| index.contains(*id));
        self.removed.retain(|id| !index.contains(*id));
        let dirty: Vec<SymbolId> = self.dirty.iter().copied().collect();
        for id in dirty {
            self.set_state(id, RecomputeState::Dirty);
        }
        self.states.retain(|id, _| index.contains(*id));
    }

    /// Symbols whose records must be deleted.
    pub fn take_removed(&mut self) -> Vec<SymbolId> {
        std::mem::take(&mut self.removed).into_iter().collect()
    }

    /// Select the next batch: up to `batch_size` dirty symbols not yet
    /// attempted in this run, plus every component awaiting cycle detection.
    /// Selected symbols move to `Recomputing`.
    pub fn plan(&mut self, index: &GraphIndex, batch_size: usize, attempted: &FxHashSet<SymbolId>) -> Vec<ComponentWork> {
        let mut work: BTreeMap<ComponentId, ComponentWork> = BTreeMap::new();

        let selected: Vec<SymbolId> = self
            .dirty
            .iter()
            .copied()
            .filter(|id| !attempted.contains(id))
            .take(batch_size.max(1))
            .collect();
        for id in selected {
            let Some(component) = index.component_of(id) else { continue };
            self.set_state(id, RecomputeState::Recomputing);
            work.entry(component)
                .or_insert_with(|| empty_work(component))
                .symbols
                .push(id);
        }

        for seed in std::mem::take(&mut self.cycle_seeds) {
            if let Some(component) = index.component_of(seed) {
                work.entry(component)
                    .or_insert_with(|| empty_work(component))
                    .redetect_cycles = true;
            }
        }

        work.into_values().collect()
    }

    /// Schedule a component for cycle re-detection on the next plan.
    pub fn defer_cycles(&mut self, component: ComponentId) {
        self.cycle_seeds.insert(component.0);
    }

    /// Recomputation succeeded: the symbol is Clean.
    pub fn complete(&mut self, id: SymbolId) {
        self.set_state(id, RecomputeState::Clean);
        self.dirty.remove(&id);
    }

    /// Recomputation failed or was cancelled: the symbol stays Dirty.
    pub fn fail(&mut self, id: SymbolId) {
        self.set_state(id, RecomputeState::Dirty);
    }

    fn set_state(&mut self, id: SymbolId, next: RecomputeState) {
        let current = self.state(id);
        if current == next {
            return;
        }
        if !current.can_transition_to(next) {
            tracing::trace!(symbol = %id, from = %current, to = %next, "forcing state transition");
        }
        if next == RecomputeState::Clean {
            self.states.remove(&id);
        } else {
            self.states.insert(id, next);
        }
    }
}

fn empty_work(component: ComponentId) -> ComponentWork {
    ComponentWork {
        component,
        symbols: Vec::new(),
        redetect_cycles: false,
    }
}
