//! Traversal policy errors. Never fatal: reported as diagnostics next to
//! whatever partial result the traversal produced.

use crate::types::SymbolId;

use super::error_code::{self, TangleErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TraversalError {
    #[error("Traversal from {start} aborted at depth limit {limit}")]
    DepthLimitExceeded { start: SymbolId, limit: u32 },

    #[error("Traversal from {start} stopped after {limit} paths")]
    PathLimitExceeded { start: SymbolId, limit: usize },
}

impl TangleErrorCode for TraversalError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DepthLimitExceeded { .. } => error_code::DEPTH_LIMIT_EXCEEDED,
            Self::PathLimitExceeded { .. } => error_code::PATH_LIMIT_EXCEEDED,
        }
    }
}
