//! Call-path engine types.

use serde::{Deserialize, Serialize};
use tangle_core::errors::TraversalError;
use tangle_core::types::SymbolId;

/// Ordered symbols from a start symbol to an end symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallPath {
    pub symbols: Vec<SymbolId>,
    /// Edges on the path.
    pub length: usize,
    /// Product of per-edge execution probabilities.
    pub probability: f64,
    /// The last edge calls back into a symbol already on the path.
    pub is_circular: bool,
}

impl CallPath {
    pub fn start(&self) -> Option<SymbolId> {
        self.symbols.first().copied()
    }

    pub fn end(&self) -> Option<SymbolId> {
        self.symbols.last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalDirection {
    /// Follow callees.
    Callees,
    /// Follow callers.
    Callers,
}

/// Result of a chain or hierarchy query: partial results travel together
/// with the diagnostics that explain why they are partial.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallChain {
    pub root: Option<SymbolId>,
    pub paths: Vec<CallPath>,
    #[serde(skip)]
    pub diagnostics: Vec<TraversalError>,
}

impl CallChain {
    pub fn is_truncated(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn max_length(&self) -> usize {
        self.paths.iter().map(|p| p.length).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Centrality {
    /// Many callers.
    Hub,
    /// Many callees.
    Utility,
    /// Many callers and callees combined.
    Central,
    #[default]
    Peripheral,
}

impl Centrality {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hub => "hub",
            Self::Utility => "utility",
            Self::Central => "central",
            Self::Peripheral => "peripheral",
        }
    }
}

impl std::fmt::Display for Centrality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub symbol: SymbolId,
    pub score: f64,
}
