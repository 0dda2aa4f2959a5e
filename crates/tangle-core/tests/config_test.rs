//! Tests for the Tangle configuration system.

use std::sync::Mutex;

use tangle_core::config::{ConfigOverrides, EngineConfig, TangleConfig};
use tangle_core::constants::{DEFAULT_HUB_THRESHOLD, DEFAULT_MAX_TRAVERSAL_DEPTH};
use tangle_core::errors::ConfigError;

/// Serializes tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

fn clear_tangle_env_vars() {
    for key in [
        "TANGLE_MAX_TRAVERSAL_DEPTH",
        "TANGLE_HUB_THRESHOLD",
        "TANGLE_MAINTAINABILITY_FLOOR",
        "TANGLE_RECOMPUTE_BATCH_SIZE",
        "TANGLE_HOTSPOT_THRESHOLD",
        "TANGLE_DATABASE_PATH",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_tangle_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("tangle.toml"),
        r#"
[engine]
max_traversal_depth = 20
hub_threshold = 4
recompute_batch_size = 32
"#,
    )
    .unwrap();

    std::env::set_var("TANGLE_HUB_THRESHOLD", "6");

    let overrides = ConfigOverrides {
        recompute_batch_size: Some(8),
        ..Default::default()
    };
    let config = TangleConfig::load(dir.path(), Some(&overrides)).unwrap();

    // Project file only
    assert_eq!(config.engine.max_traversal_depth, Some(20));
    // Env beats project
    assert_eq!(config.engine.hub_threshold, Some(6));
    // Overrides beat everything
    assert_eq!(config.engine.recompute_batch_size, Some(8));

    clear_tangle_env_vars();
}

#[test]
fn test_missing_project_file_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_tangle_env_vars();

    let dir = tempdir();
    let config = TangleConfig::load(dir.path(), None).unwrap();

    assert_eq!(
        config.engine.effective_max_traversal_depth(),
        DEFAULT_MAX_TRAVERSAL_DEPTH
    );
    assert_eq!(config.engine.effective_hub_threshold(), DEFAULT_HUB_THRESHOLD);
    assert_eq!(config.engine.effective_maintainability_floor(), 0.0);
    assert!(config.storage.effective_persist_metrics());
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_tangle_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("tangle.toml"), "[engine\nmax = ").unwrap();

    let err = TangleConfig::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_validation_rejects_zero_depth() {
    let err = TangleConfig::from_toml("[engine]\nmax_traversal_depth = 0\n").unwrap_err();
    match err {
        ConfigError::ValidationFailed { field, .. } => {
            assert_eq!(field, "engine.max_traversal_depth")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_validation_rejects_floor_out_of_range() {
    let err = TangleConfig::from_toml("[engine]\nmaintainability_floor = 120.0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let config = TangleConfig::from_toml(
        r#"
[engine]
hub_threshold = 3
future_option = "yes"

[dashboard]
theme = "dark"
"#,
    )
    .unwrap();
    assert_eq!(config.engine.hub_threshold, Some(3));
}

#[test]
fn test_toml_round_trip_preserves_values() {
    let config = TangleConfig {
        engine: EngineConfig {
            max_traversal_depth: Some(12),
            hotspot_threshold: Some(42.5),
            ..Default::default()
        },
        ..Default::default()
    };
    let text = config.to_toml().unwrap();
    let parsed = TangleConfig::from_toml(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_engine_merge_only_overrides_set_fields() {
    let mut base = EngineConfig {
        max_traversal_depth: Some(10),
        hub_threshold: Some(5),
        ..Default::default()
    };
    base.merge_from(&EngineConfig {
        hub_threshold: Some(7),
        ..Default::default()
    });
    assert_eq!(base.max_traversal_depth, Some(10));
    assert_eq!(base.hub_threshold, Some(7));
}
