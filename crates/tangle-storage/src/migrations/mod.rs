//! Schema migrations tracked by `PRAGMA user_version`.
//!
//! Each migration runs in its own transaction together with the version
//! bump, so a failed migration leaves the previous version intact.

pub mod v001_facts;
pub mod v002_analysis;

use rusqlite::Connection;
use tangle_core::errors::StorageError;

use crate::to_storage_err;

/// Ordered (version, sql) pairs. Versions start at 1 and have no gaps.
const MIGRATIONS: &[(u32, &str)] = &[
    (1, v001_facts::MIGRATION_SQL),
    (2, v002_analysis::MIGRATION_SQL),
];

pub const LATEST_VERSION: u32 = 2;

pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(to_storage_err)
}

/// Apply every migration newer than the database's version. Returns the
/// number applied.
pub fn run_migrations(conn: &Connection) -> Result<usize, StorageError> {
    let current = current_version(conn)?;
    let mut applied = 0;
    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        let batch = format!("BEGIN IMMEDIATE;\n{sql}\nPRAGMA user_version = {version};\nCOMMIT;");
        if let Err(e) = conn.execute_batch(&batch) {
            let _ = conn.execute_batch("ROLLBACK;");
            return Err(StorageError::MigrationFailed {
                version,
                message: e.to_string(),
            });
        }
        tracing::info!(version, "applied schema migration");
        applied += 1;
    }
    Ok(applied)
}
