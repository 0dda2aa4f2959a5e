//! V001: fact log and current-state fact tables.

pub const MIGRATION_SQL: &str = r#"
-- Append-only log of every effective fact mutation, in submission order.
CREATE TABLE IF NOT EXISTS fact_log (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    snapshot_id TEXT NOT NULL,
    op TEXT NOT NULL,
    payload TEXT NOT NULL,
    recorded_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_fact_log_snapshot
    ON fact_log(snapshot_id, seq);

-- Current state. payload holds the full serialized fact.
CREATE TABLE IF NOT EXISTS symbols (
    snapshot_id TEXT NOT NULL,
    symbol_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    kind TEXT NOT NULL,
    parent_id INTEGER,
    payload TEXT NOT NULL,
    PRIMARY KEY (snapshot_id, symbol_id)
) STRICT;

CREATE TABLE IF NOT EXISTS dependency_edges (
    snapshot_id TEXT NOT NULL,
    source_id INTEGER NOT NULL,
    target_id INTEGER NOT NULL,
    kind TEXT NOT NULL,
    line INTEGER NOT NULL,
    payload TEXT NOT NULL,
    PRIMARY KEY (snapshot_id, source_id, target_id, kind, line)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_dependency_edges_target
    ON dependency_edges(snapshot_id, target_id);

CREATE TABLE IF NOT EXISTS call_edges (
    snapshot_id TEXT NOT NULL,
    caller_id INTEGER NOT NULL,
    callee_id INTEGER NOT NULL,
    line INTEGER NOT NULL,
    payload TEXT NOT NULL,
    PRIMARY KEY (snapshot_id, caller_id, callee_id, line)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_call_edges_callee
    ON call_edges(snapshot_id, callee_id);
"#;
