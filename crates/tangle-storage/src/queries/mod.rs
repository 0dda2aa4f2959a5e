//! Query modules, one per table family. Every function takes a plain
//! `&Connection` so callers can run it inside a transaction.

pub mod cycles;
pub mod facts;
pub mod metrics;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tangle_core::errors::StorageError;
use tangle_core::types::SymbolId;

/// SQLite integers are signed; ids round-trip through a bit cast.
pub(crate) fn sql_id(id: SymbolId) -> i64 {
    id.get() as i64
}

pub(crate) fn symbol_id(raw: i64) -> SymbolId {
    SymbolId(raw as u64)
}

pub(crate) fn to_json<T: Serialize>(entity: &'static str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialization {
        entity,
        message: e.to_string(),
    })
}

pub(crate) fn from_json<T: DeserializeOwned>(entity: &'static str, payload: &str) -> Result<T, StorageError> {
    serde_json::from_str(payload).map_err(|e| StorageError::Serialization {
        entity,
        message: e.to_string(),
    })
}
