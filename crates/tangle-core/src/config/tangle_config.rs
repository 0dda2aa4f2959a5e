//! Top-level Tangle configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{EngineConfig, StorageConfig};
use crate::constants::{MAINTAINABILITY_CEILING, PROJECT_CONFIG_FILE};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (applied via `apply_overrides`)
/// 2. Environment variables (`TANGLE_*`)
/// 3. Project config (`tangle.toml` in project root)
/// 4. User config (`~/.tangle/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TangleConfig {
    pub engine: EngineConfig,
    pub storage: StorageConfig,
}

/// Overrides supplied programmatically by the embedding service.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_traversal_depth: Option<u32>,
    pub hub_threshold: Option<u32>,
    pub recompute_batch_size: Option<usize>,
    pub database_path: Option<String>,
}

impl TangleConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(err @ ConfigError::ParseError { .. }) => return Err(err),
                    Err(err) => {
                        tracing::warn!(error = %err, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: TangleConfig = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &TangleConfig) -> Result<(), ConfigError> {
        let engine = &config.engine;
        if engine.max_traversal_depth == Some(0) {
            return Err(validation("engine.max_traversal_depth", "must be at least 1"));
        }
        if engine.hub_threshold == Some(0) {
            return Err(validation("engine.hub_threshold", "must be at least 1"));
        }
        if engine.recompute_batch_size == Some(0) {
            return Err(validation("engine.recompute_batch_size", "must be at least 1"));
        }
        if engine.max_call_paths == Some(0) {
            return Err(validation("engine.max_call_paths", "must be at least 1"));
        }
        if let Some(floor) = engine.maintainability_floor {
            if !(0.0..=MAINTAINABILITY_CEILING).contains(&floor) {
                return Err(validation(
                    "engine.maintainability_floor",
                    "must be between 0 and 100",
                ));
            }
        }
        if let Some(threshold) = engine.hotspot_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(validation(
                    "engine.hotspot_threshold",
                    "must be a non-negative number",
                ));
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.tangle/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".tangle").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut TangleConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: TangleConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a value.
    fn merge(base: &mut TangleConfig, other: &TangleConfig) {
        base.engine.merge_from(&other.engine);

        if other.storage.database_path.is_some() {
            base.storage.database_path = other.storage.database_path.clone();
        }
        if other.storage.persist_metrics.is_some() {
            base.storage.persist_metrics = other.storage.persist_metrics;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `TANGLE_MAX_TRAVERSAL_DEPTH`, `TANGLE_HUB_THRESHOLD`, etc.
    fn apply_env_overrides(config: &mut TangleConfig) {
        if let Some(v) = env_parse::<u32>("TANGLE_MAX_TRAVERSAL_DEPTH") {
            config.engine.max_traversal_depth = Some(v);
        }
        if let Some(v) = env_parse::<u32>("TANGLE_HUB_THRESHOLD") {
            config.engine.hub_threshold = Some(v);
        }
        if let Some(v) = env_parse::<f64>("TANGLE_MAINTAINABILITY_FLOOR") {
            config.engine.maintainability_floor = Some(v);
        }
        if let Some(v) = env_parse::<usize>("TANGLE_RECOMPUTE_BATCH_SIZE") {
            config.engine.recompute_batch_size = Some(v);
        }
        if let Some(v) = env_parse::<f64>("TANGLE_HOTSPOT_THRESHOLD") {
            config.engine.hotspot_threshold = Some(v);
        }
        if let Ok(val) = std::env::var("TANGLE_DATABASE_PATH") {
            config.storage.database_path = Some(val);
        }
    }

    /// Apply explicit overrides (highest priority).
    fn apply_overrides(config: &mut TangleConfig, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.max_traversal_depth {
            config.engine.max_traversal_depth = Some(v);
        }
        if let Some(v) = overrides.hub_threshold {
            config.engine.hub_threshold = Some(v);
        }
        if let Some(v) = overrides.recompute_batch_size {
            config.engine.recompute_batch_size = Some(v);
        }
        if let Some(ref v) = overrides.database_path {
            config.storage.database_path = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn validation(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|val| val.parse::<T>().ok())
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
