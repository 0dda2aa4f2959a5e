//! FactStore: the per-snapshot source of truth for symbols and edges.
//!
//! All mutations are idempotent upserts keyed by the fact's uniqueness key.
//! Edges must reference symbols already present in the snapshot; a symbol
//! removal cascades to every incident edge.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tangle_core::errors::IngestError;
use tangle_core::types::collections::{BTreeMap, BTreeSet, FxHashMap};
use tangle_core::types::{SnapshotId, SymbolId};

use super::types::{CallEdge, CallKey, DependencyEdge, DependencyKey, EdgeKey, Symbol};
use crate::graph::GraphIndex;

/// Outcome of a single fact mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Inserted,
    Updated,
    Unchanged,
    Removed,
}

/// A mutation in the form written to the fact log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "fact", rename_all = "snake_case")]
pub enum FactMutation {
    UpsertSymbol(Symbol),
    UpsertDependency(DependencyEdge),
    UpsertCall(CallEdge),
    RemoveSymbol(SymbolId),
    RemoveDependency(DependencyKey),
    RemoveCall(CallKey),
}

impl FactMutation {
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::UpsertSymbol(_) => "upsert_symbol",
            Self::UpsertDependency(_) => "upsert_dependency",
            Self::UpsertCall(_) => "upsert_call",
            Self::RemoveSymbol(_) => "remove_symbol",
            Self::RemoveDependency(_) => "remove_dependency",
            Self::RemoveCall(_) => "remove_call",
        }
    }
}

/// What a mutation did and which symbols it invalidates.
#[derive(Debug, Clone)]
pub struct FactChange {
    pub kind: ChangeKind,
    pub mutation: FactMutation,
    /// Symbols whose derived data depends on the mutated fact.
    pub touched: Vec<SymbolId>,
}

impl FactChange {
    fn unchanged(mutation: FactMutation) -> Self {
        Self {
            kind: ChangeKind::Unchanged,
            mutation,
            touched: Vec::new(),
        }
    }

    pub fn is_effective(&self) -> bool {
        self.kind != ChangeKind::Unchanged
    }
}

/// Owned facts of one snapshot.
#[derive(Debug, Clone)]
pub struct FactStore {
    snapshot: SnapshotId,
    symbols: BTreeMap<SymbolId, Arc<Symbol>>,
    dependencies: BTreeMap<DependencyKey, DependencyEdge>,
    calls: BTreeMap<CallKey, CallEdge>,
    incident: FxHashMap<SymbolId, BTreeSet<EdgeKey>>,
    generation: u64,
}

impl FactStore {
    pub fn new(snapshot: SnapshotId) -> Self {
        Self {
            snapshot,
            symbols: BTreeMap::new(),
            dependencies: BTreeMap::new(),
            calls: BTreeMap::new(),
            incident: FxHashMap::default(),
            generation: 0,
        }
    }

    pub fn snapshot(&self) -> &SnapshotId {
        &self.snapshot
    }

    /// Bumped on every effective mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id).map(Arc::as_ref)
    }

    pub fn contains_symbol(&self, id: SymbolId) -> bool {
        self.symbols.contains_key(&id)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// `(symbols, dependencies, calls)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.symbol_count(), self.dependency_count(), self.call_count())
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values().map(Arc::as_ref)
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.dependencies.values()
    }

    pub fn calls(&self) -> impl Iterator<Item = &CallEdge> {
        self.calls.values()
    }

    pub fn validate_symbol(&self, symbol: &Symbol) -> Result<(), IngestError> {
        if symbol.name.is_empty() {
            return Err(invalid("symbol.name", format!("symbol {} has an empty name", symbol.id)));
        }
        if let Some(volume) = symbol.raw_metrics.halstead_volume {
            if !volume.is_finite() || volume < 0.0 {
                return Err(invalid(
                    "symbol.raw_metrics.halstead_volume",
                    format!("{volume} is not a non-negative number"),
                ));
            }
        }
        Ok(())
    }

    pub fn upsert_symbol(&mut self, symbol: Symbol) -> Result<FactChange, IngestError> {
        self.validate_symbol(&symbol)?;
        let id = symbol.id;
        let previous_parent = match self.symbols.get(&id) {
            Some(existing) if existing.as_ref() == &symbol => {
                return Ok(FactChange::unchanged(FactMutation::UpsertSymbol(symbol)));
            }
            Some(existing) => Some(existing.parent),
            None => None,
        };

        let mut touched = vec![id];
        touched.extend(symbol.parent);
        if let Some(Some(old_parent)) = previous_parent {
            touched.push(old_parent);
        }
        touched.sort_unstable();
        touched.dedup();

        let kind = if previous_parent.is_some() {
            ChangeKind::Updated
        } else {
            ChangeKind::Inserted
        };
        self.symbols.insert(id, Arc::new(symbol.clone()));
        self.generation += 1;
        Ok(FactChange {
            kind,
            mutation: FactMutation::UpsertSymbol(symbol),
            touched,
        })
    }

    /// Check an edge without applying it.
    pub fn validate_dependency(&self, edge: &DependencyEdge) -> Result<(), IngestError> {
        check_unit_interval("dependency.confidence", edge.confidence)?;
        if !edge.weight.is_finite() || edge.weight < 0.0 {
            return Err(invalid(
                "dependency.weight",
                format!("weight must be a non-negative number, got {}", edge.weight),
            ));
        }
        self.check_endpoints("dependency", edge.source, edge.target)
    }

    pub fn validate_call(&self, edge: &CallEdge) -> Result<(), IngestError> {
        check_unit_interval("call.execution_probability", edge.execution_probability)?;
        self.check_endpoints("call", edge.caller, edge.callee)
    }

    pub fn upsert_dependency(&mut self, mut edge: DependencyEdge) -> Result<FactChange, IngestError> {
        self.validate_dependency(&edge)?;
        // Circularity is derived from the cycle detector, never trusted from input.
        edge.flags.is_circular = false;

        let key = edge.key();
        let kind = match self.dependencies.get(&key) {
            Some(existing) if existing == &edge => {
                return Ok(FactChange::unchanged(FactMutation::UpsertDependency(edge)));
            }
            Some(_) => ChangeKind::Updated,
            None => ChangeKind::Inserted,
        };

        self.dependencies.insert(key, edge.clone());
        self.link(EdgeKey::Dependency(key), key.source, key.target);
        self.generation += 1;
        Ok(FactChange {
            kind,
            touched: endpoints(key.source, key.target),
            mutation: FactMutation::UpsertDependency(edge),
        })
    }

    pub fn upsert_call(&mut self, edge: CallEdge) -> Result<FactChange, IngestError> {
        self.validate_call(&edge)?;

        let key = edge.key();
        let kind = match self.calls.get(&key) {
            Some(existing) if existing == &edge => {
                return Ok(FactChange::unchanged(FactMutation::UpsertCall(edge)));
            }
            Some(_) => ChangeKind::Updated,
            None => ChangeKind::Inserted,
        };

        self.calls.insert(key, edge.clone());
        self.link(EdgeKey::Call(key), key.caller, key.callee);
        self.generation += 1;
        Ok(FactChange {
            kind,
            touched: endpoints(key.caller, key.callee),
            mutation: FactMutation::UpsertCall(edge),
        })
    }

    /// Remove a symbol and every edge incident to it.
    pub fn remove_symbol(&mut self, id: SymbolId) -> FactChange {
        let Some(symbol) = self.symbols.remove(&id) else {
            return FactChange::unchanged(FactMutation::RemoveSymbol(id));
        };

        let mut touched: BTreeSet<SymbolId> = BTreeSet::new();
        touched.insert(id);
        touched.extend(symbol.parent);

        let incident = self.incident.remove(&id).unwrap_or_default();
        let cascaded = incident.len();
        for key in incident {
            let (a, b) = match key {
                EdgeKey::Dependency(k) => {
                    self.dependencies.remove(&k);
                    (k.source, k.target)
                }
                EdgeKey::Call(k) => {
                    self.calls.remove(&k);
                    (k.caller, k.callee)
                }
            };
            let other = if a == id { b } else { a };
            if other != id {
                self.unlink_one(other, &key);
                touched.insert(other);
            }
        }

        tracing::debug!(
            snapshot = %self.snapshot,
            symbol = %id,
            cascaded_edges = cascaded,
            "symbol removed"
        );
        self.generation += 1;
        FactChange {
            kind: ChangeKind::Removed,
            mutation: FactMutation::RemoveSymbol(id),
            touched: touched.into_iter().collect(),
        }
    }

    pub fn remove_dependency(&mut self, key: DependencyKey) -> FactChange {
        if self.dependencies.remove(&key).is_none() {
            return FactChange::unchanged(FactMutation::RemoveDependency(key));
        }
        let edge_key = EdgeKey::Dependency(key);
        self.unlink_one(key.source, &edge_key);
        self.unlink_one(key.target, &edge_key);
        self.generation += 1;
        FactChange {
            kind: ChangeKind::Removed,
            mutation: FactMutation::RemoveDependency(key),
            touched: endpoints(key.source, key.target),
        }
    }

    pub fn remove_call(&mut self, key: CallKey) -> FactChange {
        if self.calls.remove(&key).is_none() {
            return FactChange::unchanged(FactMutation::RemoveCall(key));
        }
        let edge_key = EdgeKey::Call(key);
        self.unlink_one(key.caller, &edge_key);
        self.unlink_one(key.callee, &edge_key);
        self.generation += 1;
        FactChange {
            kind: ChangeKind::Removed,
            mutation: FactMutation::RemoveCall(key),
            touched: endpoints(key.caller, key.callee),
        }
    }

    /// Replay a logged mutation.
    pub fn apply(&mut self, mutation: FactMutation) -> Result<FactChange, IngestError> {
        match mutation {
            FactMutation::UpsertSymbol(s) => self.upsert_symbol(s),
            FactMutation::UpsertDependency(e) => self.upsert_dependency(e),
            FactMutation::UpsertCall(e) => self.upsert_call(e),
            FactMutation::RemoveSymbol(id) => Ok(self.remove_symbol(id)),
            FactMutation::RemoveDependency(k) => Ok(self.remove_dependency(k)),
            FactMutation::RemoveCall(k) => Ok(self.remove_call(k)),
        }
    }

    /// Build a read-only graph index over the current facts.
    pub fn build_index(&self) -> GraphIndex {
        GraphIndex::build(
            self.snapshot.clone(),
            self.generation,
            self.symbols.values().cloned(),
            self.dependencies.values(),
            self.calls.values(),
        )
    }

    fn check_endpoints(&self, edge: &'static str, source: SymbolId, target: SymbolId) -> Result<(), IngestError> {
        for missing in [source, target] {
            if !self.symbols.contains_key(&missing) {
                return Err(IngestError::DanglingReference {
                    snapshot: self.snapshot.clone(),
                    edge,
                    source_id: source,
                    target_id: target,
                    missing,
                });
            }
        }
        Ok(())
    }

    fn link(&mut self, key: EdgeKey, a: SymbolId, b: SymbolId) {
        self.incident.entry(a).or_default().insert(key);
        self.incident.entry(b).or_default().insert(key);
    }

    fn unlink_one(&mut self, id: SymbolId, key: &EdgeKey) {
        if let Some(keys) = self.incident.get_mut(&id) {
            keys.remove(key);
            if keys.is_empty() {
                self.incident.remove(&id);
            }
        }
    }
}

fn endpoints(a: SymbolId, b: SymbolId) -> Vec<SymbolId> {
    if a == b {
        vec![a]
    } else {
        vec![a.min(b), a.max(b)]
    }
}

fn check_unit_interval(field: &str, value: f64) -> Result<(), IngestError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is outside [0, 1]")))
    }
}

fn invalid(field: &str, message: String) -> IngestError {
    IngestError::InvalidFact {
        field: field.to_string(),
        message,
    }
}
