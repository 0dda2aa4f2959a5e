//! Configuration system for Tangle.
//! TOML-based, layered resolution: overrides > env > project > user > defaults.

pub mod engine_config;
pub mod storage_config;
pub mod tangle_config;

pub use engine_config::EngineConfig;
pub use storage_config::StorageConfig;
pub use tangle_config::{ConfigOverrides, TangleConfig};
