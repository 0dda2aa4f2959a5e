//! Shared constants for the Tangle analytics engine.

/// Tangle version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default hard bound for every depth-limited traversal.
pub const DEFAULT_MAX_TRAVERSAL_DEPTH: u32 = 50;

/// Default caller/callee count above which a symbol stops being peripheral.
pub const DEFAULT_HUB_THRESHOLD: u32 = 10;

/// Default lower clamp for the maintainability index.
pub const DEFAULT_MAINTAINABILITY_FLOOR: f64 = 0.0;

/// Upper clamp for the maintainability index.
pub const MAINTAINABILITY_CEILING: f64 = 100.0;

/// Default number of dirty symbols drained per scheduler pass.
pub const DEFAULT_RECOMPUTE_BATCH_SIZE: usize = 256;

/// Default hotspot score at or above which a symbol counts as a hotspot.
pub const DEFAULT_HOTSPOT_THRESHOLD: f64 = 100.0;

/// Default cap on the number of paths a single call-chain query may enumerate.
pub const DEFAULT_MAX_CALL_PATHS: usize = 10_000;

/// Default number of call-chain query results kept in the engine cache.
pub const DEFAULT_CHAIN_CACHE_CAPACITY: u64 = 1_024;

/// Centrality multiplier: callers + callees above `threshold * 1.5` is central.
pub const CENTRAL_MULTIPLIER: f64 = 1.5;

/// Retained diagnostics per snapshot.
pub const MAX_SNAPSHOT_DIAGNOSTICS: usize = 1_024;

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "tangle.toml";

/// Environment variable holding per-target log directives.
pub const LOG_ENV_VAR: &str = "TANGLE_LOG";
