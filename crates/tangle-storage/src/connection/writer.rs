//! BEGIN IMMEDIATE transactions for the serialized writer.

use rusqlite::{Connection, Transaction};
use tangle_core::errors::StorageError;

/// Run `f` inside a BEGIN IMMEDIATE transaction. The write lock is taken at
/// transaction start; any error rolls the whole unit back.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, StorageError>,
{
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to begin immediate transaction: {e}"),
        })?;

    // Wraps the transaction opened above; dropping it without commit rolls back.
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to wrap transaction: {e}"),
        })?;

    let result = f(&tx)?;

    tx.commit().map_err(|e| StorageError::SqliteError {
        message: format!("failed to commit: {e}"),
    })?;
    Ok(result)
}
