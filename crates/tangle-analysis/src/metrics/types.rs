//! Metrics record and supporting classification types.

use serde::{Deserialize, Serialize};
use tangle_core::types::SymbolId;

use crate::call_paths::Centrality;

/// Raw parser inputs the maintainability index depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawInput {
    HalsteadVolume,
    CyclomaticComplexity,
    LinesOfCode,
}

impl RawInput {
    pub fn name(&self) -> &'static str {
        match self {
            Self::HalsteadVolume => "halstead_volume",
            Self::CyclomaticComplexity => "cyclomatic_complexity",
            Self::LinesOfCode => "lines_of_code",
        }
    }
}

/// Zone classification on the (instability, abstractness) plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneClassification {
    /// Stable and concrete. Hard to change.
    ZoneOfPain,
    /// Unstable and abstract. Unused abstraction.
    ZoneOfUselessness,
    /// Near A + I = 1.
    MainSequence,
}

impl ZoneClassification {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ZoneOfPain => "zone_of_pain",
            Self::ZoneOfUselessness => "zone_of_uselessness",
            Self::MainSequence => "main_sequence",
        }
    }
}

impl std::fmt::Display for ZoneClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Derived metrics for one symbol. Never edited in place; a recompute
/// produces a new record with a higher revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub symbol: SymbolId,
    /// Monotonic per engine. Assigned when the record is committed.
    pub revision: u64,
    /// Dependency edges pointing at the symbol (parallel edges counted).
    pub incoming_count: u32,
    /// Dependency edges leaving the symbol (parallel edges counted).
    pub outgoing_count: u32,
    /// Distinct dependents.
    pub fan_in: u32,
    /// Distinct dependencies.
    pub fan_out: u32,
    pub coupling_factor: f64,
    pub instability: f64,
    pub abstractness: f64,
    pub distance_from_main: f64,
    /// `None` when any raw input is missing; see `missing_inputs`.
    pub maintainability_index: Option<f64>,
    pub dependency_depth: u32,
    pub is_leaf: bool,
    pub is_entry_point: bool,
    /// Distinct callers.
    pub caller_count: u32,
    /// Distinct callees.
    pub callee_count: u32,
    /// Sum of incoming call-edge frequencies.
    pub call_frequency: u64,
    /// Cyclomatic complexity, 0 when not reported.
    pub complexity_score: f64,
    pub hotspot_score: f64,
    pub centrality: Centrality,
    pub zone: ZoneClassification,
    pub missing_inputs: Vec<RawInput>,
}

impl MetricsRecord {
    pub fn is_complete(&self) -> bool {
        self.missing_inputs.is_empty()
    }

    /// Same metric values, ignoring the revision.
    pub fn same_values(&self, other: &MetricsRecord) -> bool {
        let mut a = self.clone();
        a.revision = other.revision;
        &a == other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Degrading,
    Stable,
}

/// Change in a symbol's distance from the main sequence between two snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsTrend {
    pub symbol: SymbolId,
    pub previous_distance: f64,
    pub current_distance: f64,
    pub previous_maintainability: Option<f64>,
    pub current_maintainability: Option<f64>,
    pub direction: TrendDirection,
}
