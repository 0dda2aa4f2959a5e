//! Fact model and per-snapshot fact store.

pub mod store;
pub mod types;

pub use store::{ChangeKind, FactChange, FactMutation, FactStore};
pub use types::*;
