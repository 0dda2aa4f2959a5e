//! Tracing setup: env-driven filters and idempotent initialization.

use std::sync::Mutex;

use tangle_core::constants::LOG_ENV_VAR;
use tangle_core::tracing::init_tracing;

/// Serializes tests that touch `TANGLE_LOG`.
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn per_target_directives_are_accepted() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var(LOG_ENV_VAR, "tangle_analysis::cycles=debug,tangle_storage=warn");
    init_tracing();
    tracing::debug!(target: "tangle_analysis::cycles", "filter smoke test");
    std::env::remove_var(LOG_ENV_VAR);
}

#[test]
fn invalid_filter_falls_back_without_panicking() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var(LOG_ENV_VAR, "[[not a directive");
    init_tracing();
    std::env::remove_var(LOG_ENV_VAR);
}

#[test]
fn init_is_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    tracing::info!(snapshot = "s", "still one subscriber");
}
