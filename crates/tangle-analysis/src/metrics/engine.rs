//! MetricsEngine: pure function of (graph index, raw inputs) to metrics records.

use petgraph::Direction;
use rayon::prelude::*;
use tangle_core::config::EngineConfig;
use tangle_core::errors::{MetricsError, TraversalError};
use tangle_core::types::SymbolId;

use super::depth::DepthCalculator;
use super::maintainability::maintainability_index;
use super::martin::{abstractness, coupling_factor, degree_counts, distance_from_main, instability};
use super::types::MetricsRecord;
use super::zones::classify_zone;
use crate::call_paths::{classify_centrality, hotspot_score};
use crate::facts::EdgeType;
use crate::graph::GraphIndex;

/// Tunables the metrics engine reads from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsPolicy {
    pub max_depth: u32,
    pub hub_threshold: u32,
    pub maintainability_floor: f64,
}

impl MetricsPolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_depth: config.effective_max_traversal_depth(),
            hub_threshold: config.effective_hub_threshold(),
            maintainability_floor: config.effective_maintainability_floor(),
        }
    }
}

impl Default for MetricsPolicy {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// A computed record and, when raw inputs were missing, the error explaining
/// why `maintainability_index` is absent.
#[derive(Debug, Clone)]
pub struct SymbolMetrics {
    pub record: MetricsRecord,
    pub error: Option<MetricsError>,
}

#[derive(Debug, Clone, Default)]
pub struct MetricsBatch {
    pub results: Vec<SymbolMetrics>,
    pub diagnostics: Vec<TraversalError>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEngine {
    policy: MetricsPolicy,
}

impl MetricsEngine {
    pub fn new(policy: MetricsPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MetricsPolicy {
        &self.policy
    }

    pub fn compute_all(&self, index: &GraphIndex) -> MetricsBatch {
        let symbols: Vec<SymbolId> = index.symbol_ids().collect();
        self.compute_for(index, &symbols)
    }

    /// Records for `symbols`, in the given order. Unknown ids are skipped.
    ///
    /// Depths share one memo and are computed first; the per-symbol records
    /// are then built in parallel over the immutable index.
    pub fn compute_for(&self, index: &GraphIndex, symbols: &[SymbolId]) -> MetricsBatch {
        let mut calculator = DepthCalculator::new(index, self.policy.max_depth);
        let mut diagnostics = Vec::new();
        let depths: Vec<(SymbolId, u32)> = symbols
            .iter()
            .copied()
            .filter(|s| index.contains(*s))
            .map(|s| {
                let (depth, diagnostic) = calculator.depth(s);
                diagnostics.extend(diagnostic);
                (s, depth)
            })
            .collect();

        let results = depths
            .par_iter()
            .map(|&(symbol, depth)| self.compute_one(index, symbol, depth))
            .collect();

        MetricsBatch { results, diagnostics }
    }

    /// Record for one symbol given its precomputed dependency depth.
    pub fn compute_one(&self, index: &GraphIndex, symbol: SymbolId, dependency_depth: u32) -> SymbolMetrics {
        let counts = degree_counts(index, symbol);
        let coupling = coupling_factor(&counts);
        let instability = instability(&counts);
        let abstractness = abstractness(index, symbol);

        let raw = index.symbol(symbol).map(|s| s.raw_metrics).unwrap_or_default();
        let (maintainability, missing) = match maintainability_index(&raw, self.policy.maintainability_floor) {
            Ok(mi) => (Some(mi), Vec::new()),
            Err(missing) => (None, missing),
        };

        let caller_count = index
            .distinct_neighbors(symbol, EdgeType::Call, Direction::Incoming)
            .len() as u32;
        let callee_count = index
            .distinct_neighbors(symbol, EdgeType::Call, Direction::Outgoing)
            .len() as u32;
        let call_frequency: u64 = index
            .calls_in(symbol)
            .fold(0u64, |acc, e| acc.saturating_add(e.frequency));
        let complexity_score = raw.cyclomatic_complexity.unwrap_or(0) as f64;
        let exported = index.symbol(symbol).is_some_and(|s| s.flags.exported);

        let error = (!missing.is_empty()).then(|| MetricsError::MissingRawMetric {
            symbol,
            metrics: missing.iter().map(|m| m.name()).collect(),
        });

        let record = MetricsRecord {
            symbol,
            revision: 0,
            incoming_count: counts.incoming,
            outgoing_count: counts.outgoing,
            fan_in: counts.fan_in,
            fan_out: counts.fan_out,
            coupling_factor: coupling,
            instability,
            abstractness,
            distance_from_main: distance_from_main(abstractness, instability),
            maintainability_index: maintainability,
            dependency_depth,
            is_leaf: counts.outgoing == 0 && callee_count == 0,
            is_entry_point: caller_count == 0 && (exported || callee_count > 0),
            caller_count,
            callee_count,
            call_frequency,
            complexity_score,
            hotspot_score: hotspot_score(complexity_score, call_frequency),
            centrality: classify_centrality(caller_count, callee_count, self.policy.hub_threshold),
            zone: classify_zone(instability, abstractness),
            missing_inputs: missing,
        };

        SymbolMetrics { record, error }
    }
}
