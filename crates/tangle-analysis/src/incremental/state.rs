//! Per-symbol recomputation state.

use serde::{Deserialize, Serialize};

/// `Clean -> Dirty -> Recomputing -> Clean`, with `Recomputing -> Dirty` on
/// failure or cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeState {
    #[default]
    Clean,
    Dirty,
    Recomputing,
}

impl RecomputeState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Dirty => "dirty",
            Self::Recomputing => "recomputing",
        }
    }

    pub fn can_transition_to(&self, next: RecomputeState) -> bool {
        matches!(
            (self, next),
            (Self::Clean, Self::Dirty)
                | (Self::Dirty, Self::Dirty)
                | (Self::Dirty, Self::Recomputing)
                | (Self::Recomputing, Self::Clean)
                | (Self::Recomputing, Self::Dirty)
        )
    }
}

impl std::fmt::Display for RecomputeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
