//! Persistence configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Database path. `None` keeps everything in memory.
    pub database_path: Option<String>,
    /// Persist metrics records after each recompute pass. Default: true.
    pub persist_metrics: Option<bool>,
}

impl StorageConfig {
    pub fn effective_persist_metrics(&self) -> bool {
        self.persist_metrics.unwrap_or(true)
    }
}
