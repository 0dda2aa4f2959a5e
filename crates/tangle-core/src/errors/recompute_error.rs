//! Incremental recomputation errors.

use crate::types::SymbolId;

use super::error_code::{self, TangleErrorCode};
use super::MetricsError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecomputeError {
    /// The symbol stays dirty and is retried on the next scheduler pass.
    #[error("Recomputation failed for symbol {symbol}: {reason}")]
    RecomputationFailure { symbol: SymbolId, reason: String },
}

impl From<MetricsError> for RecomputeError {
    fn from(err: MetricsError) -> Self {
        match &err {
            MetricsError::MissingRawMetric { symbol, .. } => Self::RecomputationFailure {
                symbol: *symbol,
                reason: err.to_string(),
            },
        }
    }
}

impl TangleErrorCode for RecomputeError {
    fn error_code(&self) -> &'static str {
        error_code::RECOMPUTATION_FAILURE
    }
}
