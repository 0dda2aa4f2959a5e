//! PRAGMA configuration applied to every connection.

use rusqlite::Connection;
use tangle_core::errors::StorageError;

use crate::to_storage_err;

/// WAL journaling, NORMAL sync, 64MB page cache, 5s busy timeout.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA cache_size = -64000;
        PRAGMA busy_timeout = 5000;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(to_storage_err)
}

/// Journal mode currently in effect (`wal` for file databases, `memory` otherwise).
pub fn journal_mode(conn: &Connection) -> Result<String, StorageError> {
    conn.pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(to_storage_err)
}
