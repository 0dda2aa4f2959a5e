//! Read side of the engine. Every query works on the last published view.

use std::sync::Arc;

use tangle_core::errors::{EngineError, QueryError};
use tangle_core::types::{SnapshotId, SymbolId};

use super::{AnalysisEngine, ChainKey, HealthSummary};
use crate::call_paths::{call_chain, call_hierarchy, rank_hotspots, CallChain, Centrality, ChainLimits, TraversalDirection};
use crate::cycles::{CycleReport, CycleSeverity};
use crate::diagnostics::Diagnostic;
use crate::facts::DependencyEdge;
use crate::metrics::{compute_trend, MetricsRecord, MetricsTrend};

impl AnalysisEngine {
    /// The symbol's current record. Incomplete records (missing raw inputs)
    /// are returned as-is; check `is_complete`.
    pub fn get_metrics(&self, snapshot: &SnapshotId, symbol: SymbolId) -> Result<Arc<MetricsRecord>, EngineError> {
        let (handle, view) = self.view(snapshot)?;
        match view.metrics(symbol) {
            Some(record) => Ok(Arc::clone(record)),
            None => Err(self.missing_symbol(&handle, symbol).into()),
        }
    }

    /// Cycles at or above `min_severity`, most severe first.
    pub fn list_cycles(&self, snapshot: &SnapshotId, min_severity: CycleSeverity) -> Result<Vec<CycleReport>, EngineError> {
        let (_, view) = self.view(snapshot)?;
        let mut cycles: Vec<CycleReport> = view
            .cycles()
            .filter(|c| c.severity >= min_severity)
            .cloned()
            .collect();
        cycles.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.members.cmp(&b.members)));
        Ok(cycles)
    }

    /// Every call path out of `symbol`, up to `max_depth` edges. The depth is
    /// capped by the configured traversal limit.
    pub fn get_call_chain(
        &self,
        snapshot: &SnapshotId,
        symbol: SymbolId,
        max_depth: u32,
    ) -> Result<Arc<CallChain>, EngineError> {
        self.chain_query(snapshot, symbol, max_depth, TraversalDirection::Callees)
    }

    /// Every call path into `symbol`, each listed in call order.
    pub fn get_call_hierarchy(
        &self,
        snapshot: &SnapshotId,
        symbol: SymbolId,
        max_depth: u32,
    ) -> Result<Arc<CallChain>, EngineError> {
        self.chain_query(snapshot, symbol, max_depth, TraversalDirection::Callers)
    }

    fn chain_query(
        &self,
        snapshot: &SnapshotId,
        symbol: SymbolId,
        max_depth: u32,
        direction: TraversalDirection,
    ) -> Result<Arc<CallChain>, EngineError> {
        let (handle, view) = self.view(snapshot)?;
        if !view.index().contains(symbol) {
            return Err(self.missing_symbol(&handle, symbol).into());
        }
        let limits = ChainLimits {
            max_depth: max_depth.min(self.config.effective_max_traversal_depth()).max(1),
            max_paths: self.config.effective_max_call_paths(),
        };
        let key = ChainKey {
            epoch: view.epoch,
            symbol,
            depth: limits.max_depth,
            direction,
        };
        let chain = self.chain_cache.get_with(key, || {
            let chain = match direction {
                TraversalDirection::Callees => call_chain(view.index(), symbol, limits),
                TraversalDirection::Callers => call_hierarchy(view.index(), symbol, limits),
            };
            for err in &chain.diagnostics {
                self.raise(&handle, Diagnostic::from_traversal(snapshot, err));
            }
            tracing::debug!(
                snapshot = %snapshot,
                symbol = %symbol,
                paths = chain.paths.len(),
                truncated = chain.is_truncated(),
                "call paths enumerated"
            );
            Arc::new(chain)
        });
        Ok(chain)
    }

    /// Highest hotspot scores first; equal scores by ascending symbol id.
    pub fn top_hotspots(&self, snapshot: &SnapshotId, limit: usize) -> Result<Vec<(SymbolId, f64)>, EngineError> {
        let (_, view) = self.view(snapshot)?;
        let ranked = rank_hotspots(view.metrics.values().map(|r| (r.symbol, r.hotspot_score)), limit);
        Ok(ranked.into_iter().map(|h| (h.symbol, h.score)).collect())
    }

    pub fn get_health_summary(&self, snapshot: &SnapshotId) -> Result<HealthSummary, EngineError> {
        let (_, view) = self.view(snapshot)?;
        let threshold = self.config.effective_hotspot_threshold();

        let maintainability: Vec<f64> = view.metrics.values().filter_map(|r| r.maintainability_index).collect();
        let complexity: Vec<f64> = view
            .index()
            .symbols()
            .filter_map(|s| s.raw_metrics.cyclomatic_complexity)
            .map(f64::from)
            .collect();

        Ok(HealthSummary {
            avg_maintainability: mean(&maintainability),
            avg_complexity: mean(&complexity),
            cycle_count: view.cycles.len(),
            hotspot_count: view.metrics.values().filter(|r| r.hotspot_score >= threshold).count(),
            symbol_count: view.index().symbol_count(),
            incomplete_count: view.metrics.values().filter(|r| !r.is_complete()).count(),
        })
    }

    /// Outgoing dependency edges of `symbol`, ascending by key, with
    /// `is_circular` projected from the last cycle detection.
    pub fn get_dependencies(&self, snapshot: &SnapshotId, symbol: SymbolId) -> Result<Vec<DependencyEdge>, EngineError> {
        let (handle, view) = self.view(snapshot)?;
        if !view.index().contains(symbol) {
            return Err(self.missing_symbol(&handle, symbol).into());
        }
        let mut edges: Vec<DependencyEdge> = view
            .index()
            .dependencies_out(symbol)
            .map(|edge| {
                let mut edge = edge.clone();
                edge.flags.is_circular = view.is_circular_edge(edge.source, edge.target);
                edge
            })
            .collect();
        edges.sort_by_key(DependencyEdge::key);
        Ok(edges)
    }

    pub fn centrality(&self, snapshot: &SnapshotId, symbol: SymbolId) -> Result<Centrality, EngineError> {
        Ok(self.get_metrics(snapshot, symbol)?.centrality)
    }

    /// Trends for symbols present in both snapshots, ascending by symbol.
    pub fn compare_snapshots(
        &self,
        previous: &SnapshotId,
        current: &SnapshotId,
    ) -> Result<Vec<MetricsTrend>, EngineError> {
        let (_, before) = self.view(previous)?;
        let (_, after) = self.view(current)?;
        let mut trends: Vec<MetricsTrend> = after
            .metrics
            .iter()
            .filter_map(|(id, record)| before.metrics(*id).map(|old| compute_trend(old, record)))
            .collect();
        trends.sort_by_key(|t| t.symbol);
        Ok(trends)
    }

    /// Epoch of the snapshot's published view. Changes on every recompute.
    pub fn view_epoch(&self, snapshot: &SnapshotId) -> Result<u64, QueryError> {
        Ok(self.view(snapshot)?.1.epoch)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
