//! Ingestion errors. Returned synchronously to the submitting caller.

use crate::types::{SnapshotId, SymbolId};

use super::error_code::{self, TangleErrorCode};

/// Errors raised while applying parser facts to the fact store.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{edge} edge {source_id} -> {target_id} in snapshot {snapshot} references unknown symbol {missing}")]
    DanglingReference {
        snapshot: SnapshotId,
        edge: &'static str,
        source_id: SymbolId,
        target_id: SymbolId,
        missing: SymbolId,
    },

    #[error("Invalid fact for {field}: {message}")]
    InvalidFact { field: String, message: String },
}

impl TangleErrorCode for IngestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DanglingReference { .. } => error_code::DANGLING_REFERENCE,
            Self::InvalidFact { .. } => error_code::INVALID_FACT,
        }
    }
}
