//! Engine-level error aggregating subsystem errors via `From` conversions.

use super::error_code::{self, TangleErrorCode};
use super::{ConfigError, IngestError, QueryError, RecomputeError, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Recompute error: {0}")]
    Recompute(#[from] RecomputeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analysis cancelled")]
    Cancelled,
}

impl TangleErrorCode for EngineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Ingest(e) => e.error_code(),
            Self::Query(e) => e.error_code(),
            Self::Recompute(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}
