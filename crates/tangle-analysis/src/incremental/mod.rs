//! Incremental recomputation: dirty tracking, batch planning, and the
//! component-parallel scheduler.

pub mod controller;
pub mod locks;
pub mod scheduler;
pub mod state;

pub use controller::{ComponentWork, RecomputeController};
pub use locks::ComponentLocks;
pub use scheduler::{run_pass, ComponentOutcome, PassContext};
pub use state::RecomputeState;
