//! Maintainability index.

use tangle_core::constants::MAINTAINABILITY_CEILING;

use super::types::RawInput;
use crate::facts::RawMetrics;

/// `clamp(171 - 5.2 ln(max(1, V)) - 0.23 CC - 16.2 ln(max(1, LOC)), floor, 100)`.
///
/// The `max(1, x)` inside each logarithm keeps trivially small symbols out of
/// the `ln(0)` domain. Returns the missing inputs when the parser did not
/// supply all three.
pub fn maintainability_index(raw: &RawMetrics, floor: f64) -> Result<f64, Vec<RawInput>> {
    let missing = missing_inputs(raw);
    let (Some(volume), Some(cyclomatic), Some(loc)) =
        (raw.halstead_volume, raw.cyclomatic_complexity, raw.lines_of_code)
    else {
        return Err(missing);
    };

    let volume = if volume.is_finite() { volume.max(1.0) } else { 1.0 };
    let loc = (loc as f64).max(1.0);
    let value = 171.0 - 5.2 * volume.ln() - 0.23 * cyclomatic as f64 - 16.2 * loc.ln();
    Ok(value.min(MAINTAINABILITY_CEILING).max(floor))
}

pub fn missing_inputs(raw: &RawMetrics) -> Vec<RawInput> {
    let mut missing = Vec::new();
    if raw.halstead_volume.is_none() {
        missing.push(RawInput::HalsteadVolume);
    }
    if raw.cyclomatic_complexity.is_none() {
        missing.push(RawInput::CyclomaticComplexity);
    }
    if raw.lines_of_code.is_none() {
        missing.push(RawInput::LinesOfCode);
    }
    missing
}
