//! tangle-storage: SQLite persistence for snapshot facts and analysis results.
//!
//! WAL mode, a versioned schema, and a [`SqliteFactRepository`] that plugs
//! into the analysis engine through its `FactRepository` seam.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod repository;

pub use connection::DatabaseManager;
pub use repository::SqliteFactRepository;

use tangle_core::errors::StorageError;

pub(crate) fn to_storage_err(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError { message: e.to_string() }
}
