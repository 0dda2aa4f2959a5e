//! tangle-core: shared foundations for the Tangle graph analytics engine.
//!
//! Identifiers, collections, constants, the error taxonomy, layered
//! configuration, tracing setup, cooperative cancellation and the event
//! system. Everything here is free of graph logic.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod traits;
pub mod types;

pub use config::{EngineConfig, StorageConfig, TangleConfig};
pub use errors::TangleErrorCode;
pub use traits::{Cancellable, CancellationToken};
pub use types::{SnapshotId, SymbolId};
