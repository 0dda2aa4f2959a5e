//! Metrics engine: coupling, instability, abstractness, maintainability,
//! dependency depth, and call-derived scores.

pub mod depth;
pub mod engine;
pub mod maintainability;
pub mod martin;
pub mod types;
pub mod zones;

pub use depth::DepthCalculator;
pub use engine::{MetricsBatch, MetricsEngine, MetricsPolicy, SymbolMetrics};
pub use types::{MetricsRecord, MetricsTrend, RawInput, TrendDirection, ZoneClassification};
pub use zones::{classify_zone, compute_trend};
