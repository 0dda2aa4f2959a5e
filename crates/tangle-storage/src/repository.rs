//! SQLite-backed [`FactRepository`].

use std::path::Path;

use tangle_analysis::cycles::CycleReport;
use tangle_analysis::facts::FactMutation;
use tangle_analysis::metrics::MetricsRecord;
use tangle_analysis::repository::{FactRepository, SnapshotFacts};
use tangle_core::config::StorageConfig;
use tangle_core::errors::StorageError;
use tangle_core::types::{SnapshotId, SymbolId};

use crate::connection::DatabaseManager;
use crate::queries::{cycles, facts, metrics};

/// Fact log plus current-state tables in one SQLite database. Every trait
/// method runs in a single immediate transaction.
#[derive(Debug)]
pub struct SqliteFactRepository {
    db: DatabaseManager,
}

impl SqliteFactRepository {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    pub fn open(path: &Path) -> Result<Self, StorageError> {
        DatabaseManager::open(path).map(Self::new)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        DatabaseManager::open_in_memory().map(Self::new)
    }

    /// In-memory when no database path is configured.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        match config.database_path.as_deref() {
            Some(path) => Self::open(Path::new(path)),
            None => Self::open_in_memory(),
        }
    }

    pub fn database(&self) -> &DatabaseManager {
        &self.db
    }

    /// Every logged mutation for the snapshot, oldest first.
    pub fn fact_log(&self, snapshot: &SnapshotId) -> Result<Vec<FactMutation>, StorageError> {
        self.db.with_writer(|conn| facts::read_log(conn, snapshot))
    }

    pub fn load_metrics(&self, snapshot: &SnapshotId, symbol: SymbolId) -> Result<Option<MetricsRecord>, StorageError> {
        self.db.with_writer(|conn| metrics::get_metrics(conn, snapshot, symbol))
    }

    pub fn load_cycles(&self, snapshot: &SnapshotId) -> Result<Vec<CycleReport>, StorageError> {
        self.db.with_writer(|conn| cycles::list_cycles(conn, snapshot))
    }

    pub fn top_hotspots(&self, snapshot: &SnapshotId, limit: usize) -> Result<Vec<(SymbolId, f64)>, StorageError> {
        self.db.with_writer(|conn| metrics::top_hotspots(conn, snapshot, limit))
    }
}

impl FactRepository for SqliteFactRepository {
    fn append_mutations(&self, snapshot: &SnapshotId, mutations: &[FactMutation]) -> Result<(), StorageError> {
        if mutations.is_empty() {
            return Ok(());
        }
        self.db.with_transaction(|tx| {
            facts::append_log(tx, snapshot, mutations)?;
            for mutation in mutations {
                facts::apply_mutation(tx, snapshot, mutation)?;
            }
            Ok(())
        })?;
        tracing::debug!(snapshot = %snapshot, count = mutations.len(), "fact log appended");
        Ok(())
    }

    fn store_metrics(&self, snapshot: &SnapshotId, records: &[MetricsRecord]) -> Result<(), StorageError> {
        if records.is_empty() {
            return Ok(());
        }
        self.db
            .with_transaction(|tx| metrics::upsert_metrics(tx, snapshot, records))
            .map(|_| ())
    }

    fn remove_metrics(&self, snapshot: &SnapshotId, symbols: &[SymbolId]) -> Result<(), StorageError> {
        if symbols.is_empty() {
            return Ok(());
        }
        self.db
            .with_transaction(|tx| metrics::delete_metrics(tx, snapshot, symbols))
            .map(|_| ())
    }

    fn replace_cycles(&self, snapshot: &SnapshotId, reports: &[CycleReport]) -> Result<(), StorageError> {
        self.db
            .with_transaction(|tx| cycles::replace_cycles(tx, snapshot, reports))
            .map(|_| ())
    }

    fn load_snapshot(&self, snapshot: &SnapshotId) -> Result<Option<SnapshotFacts>, StorageError> {
        self.db.with_transaction(|tx| {
            if !facts::has_snapshot(tx, snapshot)? {
                return Ok(None);
            }
            Ok(Some(SnapshotFacts {
                symbols: facts::load_symbols(tx, snapshot)?,
                dependencies: facts::load_dependencies(tx, snapshot)?,
                calls: facts::load_calls(tx, snapshot)?,
            }))
        })
    }

    fn drop_snapshot(&self, snapshot: &SnapshotId) -> Result<(), StorageError> {
        self.db.with_transaction(|tx| {
            facts::delete_snapshot(tx, snapshot)?;
            metrics::delete_snapshot(tx, snapshot)?;
            cycles::delete_snapshot(tx, snapshot)
        })?;
        tracing::info!(snapshot = %snapshot, "snapshot dropped from storage");
        Ok(())
    }
}
