//! Call-path engine: chains, hierarchies, hotspots and centrality.

pub mod chains;
pub mod hotspots;
pub mod types;

pub use chains::{call_chain, call_hierarchy, ChainLimits};
pub use hotspots::{classify_centrality, hotspot_score, rank_hotspots};
pub use types::{CallChain, CallPath, Centrality, Hotspot, TraversalDirection};
