//! Robert C. Martin coupling metrics at symbol granularity.
//!
//! Ce/Ca become fan_out/fan_in over distinct dependency neighbors, and the
//! raw edge counts give the coupling factor.

use petgraph::Direction;
use tangle_core::types::SymbolId;

use crate::facts::EdgeType;
use crate::graph::GraphIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DegreeCounts {
    pub incoming: u32,
    pub outgoing: u32,
    pub fan_in: u32,
    pub fan_out: u32,
}

pub fn degree_counts(index: &GraphIndex, symbol: SymbolId) -> DegreeCounts {
    DegreeCounts {
        incoming: index.neighbors_in(symbol, EdgeType::Dependency).count() as u32,
        outgoing: index.neighbors_out(symbol, EdgeType::Dependency).count() as u32,
        fan_in: index
            .distinct_neighbors(symbol, EdgeType::Dependency, Direction::Incoming)
            .len() as u32,
        fan_out: index
            .distinct_neighbors(symbol, EdgeType::Dependency, Direction::Outgoing)
            .len() as u32,
    }
}

/// `part / (part + other)`, 0 when both are 0. Always in [0, 1].
pub fn ratio(part: u32, other: u32) -> f64 {
    let total = part as u64 + other as u64;
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// `outgoing / (incoming + outgoing)`.
pub fn coupling_factor(counts: &DegreeCounts) -> f64 {
    ratio(counts.outgoing, counts.incoming)
}

/// `fan_out / (fan_in + fan_out)`.
pub fn instability(counts: &DegreeCounts) -> f64 {
    ratio(counts.fan_out, counts.fan_in)
}

/// Abstract declarations over all declarations in the symbol's scope.
/// Only classes and interfaces have a meaningful abstractness.
pub fn abstractness(index: &GraphIndex, symbol: SymbolId) -> f64 {
    let Some(scope) = index.symbol(symbol) else {
        return 0.0;
    };
    if !scope.kind.is_type_scope() {
        return 0.0;
    }
    let children = index.children(symbol);
    let abstract_count = children
        .iter()
        .filter_map(|child| index.symbol(*child))
        .filter(|child| child.flags.is_abstract)
        .count() as u32;
    ratio(abstract_count, children.len() as u32 - abstract_count)
}

/// `|A + I - 1|`.
pub fn distance_from_main(abstractness: f64, instability: f64) -> f64 {
    (abstractness + instability - 1.0).abs()
}
