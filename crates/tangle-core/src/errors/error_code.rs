//! TangleErrorCode trait for stable, machine-readable error codes.

/// Every error enum implements this so consumers (dashboards, orchestration)
/// can branch on a stable code instead of parsing messages.
pub trait TangleErrorCode {
    /// Returns the error code string (e.g., "DANGLING_REFERENCE").
    fn error_code(&self) -> &'static str;

    /// Returns `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const DANGLING_REFERENCE: &str = "DANGLING_REFERENCE";
pub const INVALID_FACT: &str = "INVALID_FACT";
pub const DEPTH_LIMIT_EXCEEDED: &str = "DEPTH_LIMIT_EXCEEDED";
pub const PATH_LIMIT_EXCEEDED: &str = "PATH_LIMIT_EXCEEDED";
pub const MISSING_RAW_METRIC: &str = "MISSING_RAW_METRIC";
pub const RECOMPUTATION_FAILURE: &str = "RECOMPUTATION_FAILURE";
pub const UNKNOWN_SNAPSHOT: &str = "UNKNOWN_SNAPSHOT";
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN_SYMBOL";
pub const METRICS_PENDING: &str = "METRICS_PENDING";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const CANCELLED: &str = "CANCELLED";
