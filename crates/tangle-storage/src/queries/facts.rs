//! fact_log and current-state fact tables.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};
use tangle_analysis::facts::{CallEdge, CallKey, DependencyEdge, DependencyKey, FactMutation, Symbol};
use tangle_core::errors::StorageError;
use tangle_core::types::{SnapshotId, SymbolId};

use super::{from_json, sql_id, to_json};
use crate::to_storage_err;

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Append mutations to the log in order. Returns the number appended.
pub fn append_log(conn: &Connection, snapshot: &SnapshotId, mutations: &[FactMutation]) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO fact_log (snapshot_id, op, payload, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(to_storage_err)?;
    let recorded_at = now_secs();
    for mutation in mutations {
        let payload = to_json("fact_mutation", mutation)?;
        stmt.execute(params![snapshot.as_str(), mutation.op_name(), payload, recorded_at])
            .map_err(to_storage_err)?;
    }
    Ok(mutations.len())
}

/// Logged mutations for a snapshot, oldest first.
pub fn read_log(conn: &Connection, snapshot: &SnapshotId) -> Result<Vec<FactMutation>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT payload FROM fact_log WHERE snapshot_id = ?1 ORDER BY seq")
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![snapshot.as_str()], |row| row.get::<_, String>(0))
        .map_err(to_storage_err)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(from_json("fact_mutation", &row.map_err(to_storage_err)?)?);
    }
    Ok(result)
}

pub fn log_len(conn: &Connection, snapshot: &SnapshotId) -> Result<usize, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM fact_log WHERE snapshot_id = ?1",
        params![snapshot.as_str()],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as usize)
    .map_err(to_storage_err)
}

/// Whether any fact for the snapshot was ever logged.
pub fn has_snapshot(conn: &Connection, snapshot: &SnapshotId) -> Result<bool, StorageError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM fact_log WHERE snapshot_id = ?1)",
        params![snapshot.as_str()],
        |row| row.get::<_, bool>(0),
    )
    .map_err(to_storage_err)
}

/// Mirror one mutation into the current-state tables.
///
/// Symbol removal cascades to every incident edge, matching the in-memory
/// fact store.
pub fn apply_mutation(conn: &Connection, snapshot: &SnapshotId, mutation: &FactMutation) -> Result<(), StorageError> {
    match mutation {
        FactMutation::UpsertSymbol(symbol) => upsert_symbol(conn, snapshot, symbol),
        FactMutation::UpsertDependency(edge) => upsert_dependency(conn, snapshot, edge),
        FactMutation::UpsertCall(edge) => upsert_call(conn, snapshot, edge),
        FactMutation::RemoveSymbol(id) => remove_symbol(conn, snapshot, *id),
        FactMutation::RemoveDependency(key) => remove_dependency(conn, snapshot, key),
        FactMutation::RemoveCall(key) => remove_call(conn, snapshot, key),
    }
}

pub fn upsert_symbol(conn: &Connection, snapshot: &SnapshotId, symbol: &Symbol) -> Result<(), StorageError> {
    let payload = to_json("symbol", symbol)?;
    conn.prepare_cached(
        "INSERT OR REPLACE INTO symbols (snapshot_id, symbol_id, name, kind, parent_id, payload)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![
            snapshot.as_str(),
            sql_id(symbol.id),
            symbol.name,
            symbol.kind.name(),
            symbol.parent.map(sql_id),
            payload,
        ])
    })
    .map(|_| ())
    .map_err(to_storage_err)
}

pub fn upsert_dependency(conn: &Connection, snapshot: &SnapshotId, edge: &DependencyEdge) -> Result<(), StorageError> {
    let payload = to_json("dependency_edge", edge)?;
    let key = edge.key();
    conn.prepare_cached(
        "INSERT OR REPLACE INTO dependency_edges (snapshot_id, source_id, target_id, kind, line, payload)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![
            snapshot.as_str(),
            sql_id(key.source),
            sql_id(key.target),
            key.kind.name(),
            key.line,
            payload,
        ])
    })
    .map(|_| ())
    .map_err(to_storage_err)
}

pub fn upsert_call(conn: &Connection, snapshot: &SnapshotId, edge: &CallEdge) -> Result<(), StorageError> {
    let payload = to_json("call_edge", edge)?;
    let key = edge.key();
    conn.prepare_cached(
        "INSERT OR REPLACE INTO call_edges (snapshot_id, caller_id, callee_id, line, payload)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![
            snapshot.as_str(),
            sql_id(key.caller),
            sql_id(key.callee),
            key.line,
            payload,
        ])
    })
    .map(|_| ())
    .map_err(to_storage_err)
}

pub fn remove_symbol(conn: &Connection, snapshot: &SnapshotId, id: SymbolId) -> Result<(), StorageError> {
    let s = snapshot.as_str();
    let raw = sql_id(id);
    conn.execute(
        "DELETE FROM dependency_edges WHERE snapshot_id = ?1 AND (source_id = ?2 OR target_id = ?2)",
        params![s, raw],
    )
    .map_err(to_storage_err)?;
    conn.execute(
        "DELETE FROM call_edges WHERE snapshot_id = ?1 AND (caller_id = ?2 OR callee_id = ?2)",
        params![s, raw],
    )
    .map_err(to_storage_err)?;
    conn.execute(
        "DELETE FROM symbols WHERE snapshot_id = ?1 AND symbol_id = ?2",
        params![s, raw],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

pub fn remove_dependency(conn: &Connection, snapshot: &SnapshotId, key: &DependencyKey) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM dependency_edges
         WHERE snapshot_id = ?1 AND source_id = ?2 AND target_id = ?3 AND kind = ?4 AND line = ?5",
        params![snapshot.as_str(), sql_id(key.source), sql_id(key.target), key.kind.name(), key.line],
    )
    .map(|_| ())
    .map_err(to_storage_err)
}

pub fn remove_call(conn: &Connection, snapshot: &SnapshotId, key: &CallKey) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM call_edges
         WHERE snapshot_id = ?1 AND caller_id = ?2 AND callee_id = ?3 AND line = ?4",
        params![snapshot.as_str(), sql_id(key.caller), sql_id(key.callee), key.line],
    )
    .map(|_| ())
    .map_err(to_storage_err)
}

fn load_payloads<T: serde::de::DeserializeOwned>(
    conn: &Connection,
    sql: &str,
    entity: &'static str,
    snapshot: &SnapshotId,
) -> Result<Vec<T>, StorageError> {
    let mut stmt = conn.prepare_cached(sql).map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![snapshot.as_str()], |row| row.get::<_, String>(0))
        .map_err(to_storage_err)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(from_json(entity, &row.map_err(to_storage_err)?)?);
    }
    Ok(result)
}

/// Current symbols, ascending by id.
pub fn load_symbols(conn: &Connection, snapshot: &SnapshotId) -> Result<Vec<Symbol>, StorageError> {
    load_payloads(
        conn,
        "SELECT payload FROM symbols WHERE snapshot_id = ?1 ORDER BY symbol_id",
        "symbol",
        snapshot,
    )
}

pub fn load_dependencies(conn: &Connection, snapshot: &SnapshotId) -> Result<Vec<DependencyEdge>, StorageError> {
    load_payloads(
        conn,
        "SELECT payload FROM dependency_edges WHERE snapshot_id = ?1
         ORDER BY source_id, target_id, kind, line",
        "dependency_edge",
        snapshot,
    )
}

pub fn load_calls(conn: &Connection, snapshot: &SnapshotId) -> Result<Vec<CallEdge>, StorageError> {
    load_payloads(
        conn,
        "SELECT payload FROM call_edges WHERE snapshot_id = ?1 ORDER BY caller_id, callee_id, line",
        "call_edge",
        snapshot,
    )
}

/// Delete the snapshot's log and current-state rows.
pub fn delete_snapshot(conn: &Connection, snapshot: &SnapshotId) -> Result<(), StorageError> {
    for table in ["fact_log", "symbols", "dependency_edges", "call_edges"] {
        conn.execute(&format!("DELETE FROM {table} WHERE snapshot_id = ?1"), params![snapshot.as_str()])
            .map_err(to_storage_err)?;
    }
    Ok(())
}
