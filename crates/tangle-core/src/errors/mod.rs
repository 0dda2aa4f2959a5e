//! Error handling for Tangle.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod engine_error;
pub mod error_code;
pub mod ingest_error;
pub mod metrics_error;
pub mod query_error;
pub mod recompute_error;
pub mod storage_error;
pub mod traversal_error;

pub use config_error::ConfigError;
pub use engine_error::EngineError;
pub use error_code::TangleErrorCode;
pub use ingest_error::IngestError;
pub use metrics_error::MetricsError;
pub use query_error::QueryError;
pub use recompute_error::RecomputeError;
pub use storage_error::StorageError;
pub use traversal_error::TraversalError;
