//! cycle_reports table. The set is always replaced wholesale.

use rusqlite::{params, Connection};
use tangle_analysis::cycles::CycleReport;
use tangle_core::errors::StorageError;
use tangle_core::types::SnapshotId;

use super::{from_json, to_json};
use crate::to_storage_err;

pub fn replace_cycles(conn: &Connection, snapshot: &SnapshotId, cycles: &[CycleReport]) -> Result<usize, StorageError> {
    delete_snapshot(conn, snapshot)?;
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO cycle_reports (snapshot_id, cycle_id, kind, severity, length, members, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(to_storage_err)?;
    for cycle in cycles {
        let members = to_json("cycle_members", &cycle.members)?;
        let payload = to_json("cycle_report", cycle)?;
        stmt.execute(params![
            snapshot.as_str(),
            cycle.id.to_hex(),
            cycle.kind.name(),
            cycle.severity.name(),
            cycle.length as i64,
            members,
            payload,
        ])
        .map_err(to_storage_err)?;
    }
    Ok(cycles.len())
}

/// Stored cycles ordered by id.
pub fn list_cycles(conn: &Connection, snapshot: &SnapshotId) -> Result<Vec<CycleReport>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT payload FROM cycle_reports WHERE snapshot_id = ?1 ORDER BY cycle_id")
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![snapshot.as_str()], |row| row.get::<_, String>(0))
        .map_err(to_storage_err)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(from_json("cycle_report", &row.map_err(to_storage_err)?)?);
    }
    Ok(result)
}

pub fn delete_snapshot(conn: &Connection, snapshot: &SnapshotId) -> Result<(), StorageError> {
    conn.execute("DELETE FROM cycle_reports WHERE snapshot_id = ?1", params![snapshot.as_str()])
        .map(|_| ())
        .map_err(to_storage_err)
}
