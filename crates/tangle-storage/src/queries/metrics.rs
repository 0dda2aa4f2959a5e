//! metrics_records table.

use rusqlite::{params, Connection};
use tangle_analysis::metrics::MetricsRecord;
use tangle_core::errors::StorageError;
use tangle_core::types::{SnapshotId, SymbolId};

use super::{from_json, sql_id, to_json};
use crate::to_storage_err;

pub fn upsert_metrics(conn: &Connection, snapshot: &SnapshotId, records: &[MetricsRecord]) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR REPLACE INTO metrics_records
             (snapshot_id, symbol_id, revision, maintainability_index, hotspot_score, is_complete, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(to_storage_err)?;
    for record in records {
        let payload = to_json("metrics_record", record)?;
        stmt.execute(params![
            snapshot.as_str(),
            sql_id(record.symbol),
            record.revision as i64,
            record.maintainability_index,
            record.hotspot_score,
            record.is_complete(),
            payload,
        ])
        .map_err(to_storage_err)?;
    }
    Ok(records.len())
}

pub fn delete_metrics(conn: &Connection, snapshot: &SnapshotId, symbols: &[SymbolId]) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached("DELETE FROM metrics_records WHERE snapshot_id = ?1 AND symbol_id = ?2")
        .map_err(to_storage_err)?;
    let mut deleted = 0;
    for &symbol in symbols {
        deleted += stmt
            .execute(params![snapshot.as_str(), sql_id(symbol)])
            .map_err(to_storage_err)?;
    }
    Ok(deleted)
}

pub fn get_metrics(conn: &Connection, snapshot: &SnapshotId, symbol: SymbolId) -> Result<Option<MetricsRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT payload FROM metrics_records WHERE snapshot_id = ?1 AND symbol_id = ?2")
        .map_err(to_storage_err)?;
    let mut rows = stmt
        .query(params![snapshot.as_str(), sql_id(symbol)])
        .map_err(to_storage_err)?;
    match rows.next().map_err(to_storage_err)? {
        Some(row) => {
            let payload: String = row.get(0).map_err(to_storage_err)?;
            Ok(Some(from_json("metrics_record", &payload)?))
        }
        None => Ok(None),
    }
}

/// Symbols ordered by stored hotspot score, highest first.
pub fn top_hotspots(conn: &Connection, snapshot: &SnapshotId, limit: usize) -> Result<Vec<(SymbolId, f64)>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT symbol_id, hotspot_score FROM metrics_records
             WHERE snapshot_id = ?1
             ORDER BY hotspot_score DESC, symbol_id ASC
             LIMIT ?2",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![snapshot.as_str(), limit as i64], |row| {
            Ok((super::symbol_id(row.get(0)?), row.get::<_, f64>(1)?))
        })
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

pub fn count_metrics(conn: &Connection, snapshot: &SnapshotId) -> Result<usize, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM metrics_records WHERE snapshot_id = ?1",
        params![snapshot.as_str()],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as usize)
    .map_err(to_storage_err)
}

pub fn delete_snapshot(conn: &Connection, snapshot: &SnapshotId) -> Result<(), StorageError> {
    conn.execute("DELETE FROM metrics_records WHERE snapshot_id = ?1", params![snapshot.as_str()])
        .map(|_| ())
        .map_err(to_storage_err)
}
