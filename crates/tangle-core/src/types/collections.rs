//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::{BTreeMap, BTreeSet};

/// SmallVec sized for cycle members (most real cycles are short).
pub type SmallVec4<T> = SmallVec<[T; 4]>;

/// SmallVec sized for per-symbol neighbor lists.
pub type SmallVec8<T> = SmallVec<[T; 8]>;
