//! Read-only graph index over a snapshot's facts.

pub mod components;
pub mod index;

pub use components::ComponentId;
pub use index::GraphIndex;
