//! Cycle report types.

use serde::{Deserialize, Serialize};
use tangle_core::types::SymbolId;
use xxhash_rust::xxh3::xxh3_64;

/// How a call cycle recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecursionKind {
    /// A symbol calls itself.
    Direct,
    /// Two symbols call each other.
    Mutual,
    /// Three or more symbols form the loop.
    Indirect,
}

impl RecursionKind {
    pub fn for_length(length: usize) -> Self {
        match length {
            0 | 1 => Self::Direct,
            2 => Self::Mutual,
            _ => Self::Indirect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "recursion", rename_all = "snake_case")]
pub enum CycleKind {
    Dependency,
    Recursion(RecursionKind),
}

impl CycleKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dependency => "dependency",
            Self::Recursion(RecursionKind::Direct) => "direct_recursion",
            Self::Recursion(RecursionKind::Mutual) => "mutual_recursion",
            Self::Recursion(RecursionKind::Indirect) => "indirect_recursion",
        }
    }

    fn hash_tag(&self) -> u8 {
        match self {
            Self::Dependency => 0,
            Self::Recursion(_) => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CycleSeverity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Severity policy.
    ///
    /// Dependency cycles: self-loop low, 2 members medium, 3-5 high, longer critical.
    /// Recursion: direct low, mutual medium, indirect high, longer than 5 critical.
    pub fn classify(kind: CycleKind, length: usize) -> Self {
        match kind {
            CycleKind::Dependency => match length {
                0 | 1 => Self::Low,
                2 => Self::Medium,
                3..=5 => Self::High,
                _ => Self::Critical,
            },
            CycleKind::Recursion(RecursionKind::Direct) => Self::Low,
            CycleKind::Recursion(RecursionKind::Mutual) => Self::Medium,
            CycleKind::Recursion(RecursionKind::Indirect) if length <= 5 => Self::High,
            CycleKind::Recursion(RecursionKind::Indirect) => Self::Critical,
        }
    }
}

impl std::fmt::Display for CycleSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Content-derived cycle identifier: the same canonical member list always
/// hashes to the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleId(pub u64);

impl CycleId {
    pub fn of(kind: CycleKind, canonical_members: &[SymbolId]) -> Self {
        let mut bytes = Vec::with_capacity(1 + canonical_members.len() * 8);
        bytes.push(kind.hash_tag());
        for id in canonical_members {
            bytes.extend_from_slice(&id.get().to_le_bytes());
        }
        Self(xxh3_64(&bytes))
    }

    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }

    pub fn from_hex(value: &str) -> Option<Self> {
        u64::from_str_radix(value, 16).ok().map(Self)
    }
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// One edge of a cycle that could be removed to break it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakSuggestion {
    pub from: SymbolId,
    pub to: SymbolId,
    /// Aggregate strength of the edge(s) from `from` to `to`; lower is cheaper to cut.
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub id: CycleId,
    pub kind: CycleKind,
    /// Canonical rotation: starts at the lowest id, follows edge order, no repeated closing member.
    pub members: Vec<SymbolId>,
    pub length: usize,
    pub severity: CycleSeverity,
    /// Cheapest edge first.
    pub break_suggestions: Vec<BreakSuggestion>,
}

impl CycleReport {
    pub fn contains(&self, id: SymbolId) -> bool {
        self.members.contains(&id)
    }

    /// Consecutive `(from, to)` pairs including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (SymbolId, SymbolId)> + '_ {
        let n = self.members.len();
        (0..n).map(move |i| (self.members[i], self.members[(i + 1) % n]))
    }

    /// Members with the first repeated at the end.
    pub fn closed_path(&self) -> Vec<SymbolId> {
        let mut path = self.members.clone();
        if let Some(&first) = self.members.first() {
            path.push(first);
        }
        path
    }
}

/// Rotate a cycle so it starts at its lowest member. Direction is preserved.
pub fn canonicalize(members: &[SymbolId]) -> Vec<SymbolId> {
    let Some(start) = members
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(members.len());
    out.extend_from_slice(&members[start..]);
    out.extend_from_slice(&members[..start]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<SymbolId> {
        raw.iter().copied().map(SymbolId).collect()
    }

    #[test]
    fn rotation_starts_at_lowest_member() {
        assert_eq!(canonicalize(&ids(&[7, 3, 5])), ids(&[3, 5, 7]));
        assert_eq!(canonicalize(&ids(&[3, 5, 7])), ids(&[3, 5, 7]));
        assert!(canonicalize(&[]).is_empty());
    }

    #[test]
    fn id_depends_on_direction_and_kind() {
        let forward = CycleId::of(CycleKind::Dependency, &ids(&[1, 2, 3]));
        let backward = CycleId::of(CycleKind::Dependency, &ids(&[1, 3, 2]));
        let recursion = CycleId::of(CycleKind::Recursion(RecursionKind::Indirect), &ids(&[1, 2, 3]));
        assert_ne!(forward, backward);
        assert_ne!(forward, recursion);
        assert_eq!(forward, CycleId::of(CycleKind::Dependency, &ids(&[1, 2, 3])));
        assert_eq!(CycleId::from_hex(&forward.to_hex()), Some(forward));
    }

    #[test]
    fn severity_policy() {
        assert_eq!(CycleSeverity::classify(CycleKind::Dependency, 1), CycleSeverity::Low);
        assert_eq!(CycleSeverity::classify(CycleKind::Dependency, 2), CycleSeverity::Medium);
        assert_eq!(CycleSeverity::classify(CycleKind::Dependency, 5), CycleSeverity::High);
        assert_eq!(CycleSeverity::classify(CycleKind::Dependency, 6), CycleSeverity::Critical);
        assert!(CycleSeverity::Critical > CycleSeverity::Low);
    }
}
