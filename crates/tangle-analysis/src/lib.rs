//! tangle-analysis: graph analytics over parser-supplied code facts.
//!
//! Pipeline per snapshot: facts → immutable [`graph::GraphIndex`] →
//! cycle detection, metrics and call paths → published view. The
//! [`engine::AnalysisEngine`] ties the pieces together and keeps derived
//! results current through incremental recomputation.

pub mod call_paths;
pub mod cycles;
pub mod diagnostics;
pub mod engine;
pub mod facts;
pub mod graph;
pub mod incremental;
pub mod metrics;
pub mod repository;

pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use engine::{AnalysisEngine, HealthSummary, IngestSummary, RecomputeReport, SnapshotView};
pub use facts::{CallEdge, DependencyEdge, FactStore, Symbol, SymbolKind};
pub use graph::GraphIndex;
pub use repository::{FactRepository, SnapshotFacts};
