//! V002: derived analysis results. metrics_records, cycle_reports.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS metrics_records (
    snapshot_id TEXT NOT NULL,
    symbol_id INTEGER NOT NULL,
    revision INTEGER NOT NULL,
    maintainability_index REAL,
    hotspot_score REAL NOT NULL,
    is_complete INTEGER NOT NULL,
    payload TEXT NOT NULL,
    PRIMARY KEY (snapshot_id, symbol_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_metrics_records_hotspot
    ON metrics_records(snapshot_id, hotspot_score DESC);

CREATE TABLE IF NOT EXISTS cycle_reports (
    snapshot_id TEXT NOT NULL,
    cycle_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    severity TEXT NOT NULL,
    length INTEGER NOT NULL,
    members TEXT NOT NULL,
    payload TEXT NOT NULL,
    PRIMARY KEY (snapshot_id, cycle_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_cycle_reports_severity
    ON cycle_reports(snapshot_id, severity);
"#;
