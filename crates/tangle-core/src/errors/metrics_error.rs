//! Metrics computation errors.

use crate::types::SymbolId;

use super::error_code::{self, TangleErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    /// The parser did not supply an input the maintainability index needs.
    /// The record is marked incomplete instead of using a made-up default.
    #[error("Symbol {symbol} is missing raw metric(s): {}", .metrics.join(", "))]
    MissingRawMetric {
        symbol: SymbolId,
        metrics: Vec<&'static str>,
    },
}

impl TangleErrorCode for MetricsError {
    fn error_code(&self) -> &'static str {
        error_code::MISSING_RAW_METRIC
    }
}
