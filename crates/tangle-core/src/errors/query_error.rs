//! Query API errors.

use crate::types::{SnapshotId, SymbolId};

use super::error_code::{self, TangleErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Unknown snapshot: {snapshot}")]
    UnknownSnapshot { snapshot: SnapshotId },

    #[error("Unknown symbol {symbol} in snapshot {snapshot}")]
    UnknownSymbol { snapshot: SnapshotId, symbol: SymbolId },

    #[error("Metrics for symbol {symbol} in snapshot {snapshot} have not been computed yet")]
    MetricsPending { snapshot: SnapshotId, symbol: SymbolId },
}

impl TangleErrorCode for QueryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSnapshot { .. } => error_code::UNKNOWN_SNAPSHOT,
            Self::UnknownSymbol { .. } => error_code::UNKNOWN_SYMBOL,
            Self::MetricsPending { .. } => error_code::METRICS_PENDING,
        }
    }
}
