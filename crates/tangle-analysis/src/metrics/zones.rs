//! Zone classification and trend tracking between snapshots.

use super::types::{MetricsRecord, MetricsTrend, TrendDirection, ZoneClassification};

/// Distance at or below which a symbol sits on the main sequence.
const MAIN_SEQUENCE_THRESHOLD: f64 = 0.3;

/// Minimum change in distance that counts as a trend.
const TREND_EPSILON: f64 = 0.05;

/// - Zone of Pain: stable (low I) and concrete (low A)
/// - Zone of Uselessness: unstable (high I) and abstract (high A)
/// - Main Sequence: `|A + I - 1| <= 0.3`, or anything not clearly in a zone
pub fn classify_zone(instability: f64, abstractness: f64) -> ZoneClassification {
    let distance = (abstractness + instability - 1.0).abs();

    if distance <= MAIN_SEQUENCE_THRESHOLD {
        ZoneClassification::MainSequence
    } else if instability < 0.5 && abstractness < 0.5 {
        ZoneClassification::ZoneOfPain
    } else if instability > 0.5 && abstractness > 0.5 {
        ZoneClassification::ZoneOfUselessness
    } else {
        ZoneClassification::MainSequence
    }
}

/// Direction is judged on distance from the main sequence: lower is better.
pub fn compute_trend(previous: &MetricsRecord, current: &MetricsRecord) -> MetricsTrend {
    let direction = if current.distance_from_main < previous.distance_from_main - TREND_EPSILON {
        TrendDirection::Improving
    } else if current.distance_from_main > previous.distance_from_main + TREND_EPSILON {
        TrendDirection::Degrading
    } else {
        TrendDirection::Stable
    };

    MetricsTrend {
        symbol: current.symbol,
        previous_distance: previous.distance_from_main,
        current_distance: current.distance_from_main,
        previous_maintainability: previous.maintainability_index,
        current_maintainability: current.maintainability_index,
        direction,
    }
}
