//! Observability for Tangle: `tracing` with an `EnvFilter` driven by `TANGLE_LOG`.

pub mod setup;

pub use setup::init_tracing;
