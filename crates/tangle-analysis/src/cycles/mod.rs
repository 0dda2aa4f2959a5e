//! Cycle detection: dependency cycles and call recursion.

pub mod detector;
pub mod types;

pub use detector::{CycleDetector, DetectionOutcome};
pub use types::{
    canonicalize, BreakSuggestion, CycleId, CycleKind, CycleReport, CycleSeverity, RecursionKind,
};
