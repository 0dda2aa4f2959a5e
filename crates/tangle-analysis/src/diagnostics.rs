//! Diagnostics: non-fatal problems attached to a snapshot.
//!
//! Traversal limits, missing raw metrics, failed recomputations and storage
//! write failures are never returned as errors from the analysis path. They
//! are published on a bounded crossbeam channel and retained per snapshot.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tangle_core::errors::{error_code, RecomputeError, StorageError, TangleErrorCode, TraversalError};
use tangle_core::events::DiagnosticEvent;
use tangle_core::types::{SnapshotId, SymbolId};

/// Channel capacity. When full, the oldest undelivered diagnostic is dropped.
const CHANNEL_CAPACITY: usize = 4_096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    DepthLimitExceeded,
    PathLimitExceeded,
    RecomputationFailure,
    StorageFailure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub snapshot: SnapshotId,
    pub symbol: Option<SymbolId>,
    pub kind: DiagnosticKind,
    pub code: String,
    pub message: String,
}

impl Diagnostic {
    pub fn from_traversal(snapshot: &SnapshotId, err: &TraversalError) -> Self {
        let (kind, symbol) = match err {
            TraversalError::DepthLimitExceeded { start, .. } => (DiagnosticKind::DepthLimitExceeded, *start),
            TraversalError::PathLimitExceeded { start, .. } => (DiagnosticKind::PathLimitExceeded, *start),
        };
        Self {
            snapshot: snapshot.clone(),
            symbol: Some(symbol),
            kind,
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn from_recompute(snapshot: &SnapshotId, err: &RecomputeError) -> Self {
        let RecomputeError::RecomputationFailure { symbol, .. } = err;
        Self {
            snapshot: snapshot.clone(),
            symbol: Some(*symbol),
            kind: DiagnosticKind::RecomputationFailure,
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn from_storage(snapshot: &SnapshotId, err: &StorageError) -> Self {
        Self {
            snapshot: snapshot.clone(),
            symbol: None,
            kind: DiagnosticKind::StorageFailure,
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_depth_limit(&self) -> bool {
        self.code == error_code::DEPTH_LIMIT_EXCEEDED
    }

    pub fn to_event(&self) -> DiagnosticEvent {
        DiagnosticEvent {
            snapshot: self.snapshot.clone(),
            symbol: self.symbol,
            code: self.code.clone(),
            message: self.message.clone(),
        }
    }
}

/// Publishing side of the diagnostics channel.
///
/// Receivers obtained from `subscribe` share one queue: each diagnostic is
/// delivered to exactly one of them.
#[derive(Debug, Clone)]
pub struct DiagnosticsHub {
    sender: Sender<Diagnostic>,
    receiver: Receiver<Diagnostic>,
}

impl DiagnosticsHub {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);
        Self { sender, receiver }
    }

    pub fn subscribe(&self) -> Receiver<Diagnostic> {
        self.receiver.clone()
    }

    pub fn publish(&self, diagnostic: Diagnostic) {
        let mut pending = diagnostic;
        loop {
            match self.sender.try_send(pending) {
                Ok(()) => return,
                Err(TrySendError::Full(back)) => {
                    // drop the oldest to make room
                    let _ = self.receiver.try_recv();
                    pending = back;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

impl Default for DiagnosticsHub {
    fn default() -> Self {
        Self::new()
    }
}
