//! Fact types: symbols, dependency edges, call edges, and their uniqueness keys.

use serde::{Deserialize, Serialize};
use tangle_core::types::SymbolId;

/// Kind of a symbol reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Interface,
    Variable,
    Import,
    Module,
    Other,
}

impl SymbolKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Variable => "variable",
            Self::Import => "import",
            Self::Module => "module",
            Self::Other => "other",
        }
    }

    /// Kinds whose members count towards abstractness.
    pub fn is_type_scope(&self) -> bool {
        matches!(self, Self::Class | Self::Interface)
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
}

/// Line/column span of a definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SourceLocation {
    pub file: String,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            file: file.into(),
            start_line,
            start_column: 0,
            end_line,
            end_column: 0,
        }
    }
}

/// Single point in a file: a dependency's context or a call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Site {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Site {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SymbolFlags {
    pub exported: bool,
    pub is_abstract: bool,
    pub is_static: bool,
    pub is_async: bool,
    pub is_recursive: bool,
}

/// Complexity inputs computed by the external parser. `None` means the
/// parser did not report the value; nothing downstream invents one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RawMetrics {
    pub cyclomatic_complexity: Option<u32>,
    pub cognitive_complexity: Option<u32>,
    pub halstead_volume: Option<f64>,
    pub lines_of_code: Option<u32>,
    pub parameter_count: Option<u32>,
}

impl RawMetrics {
    /// Inputs sufficient for the maintainability index.
    pub fn complete(cyclomatic_complexity: u32, halstead_volume: f64, lines_of_code: u32) -> Self {
        Self {
            cyclomatic_complexity: Some(cyclomatic_complexity),
            halstead_volume: Some(halstead_volume),
            lines_of_code: Some(lines_of_code),
            ..Default::default()
        }
    }
}

/// A definition in the analyzed codebase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub qualified_name: String,
    pub kind: SymbolKind,
    pub location: SourceLocation,
    pub visibility: Visibility,
    pub flags: SymbolFlags,
    pub raw_metrics: RawMetrics,
    /// Containing scope (e.g. the class declaring a method).
    pub parent: Option<SymbolId>,
    pub signature: Option<String>,
}

impl Symbol {
    pub fn new(id: impl Into<SymbolId>, name: impl Into<String>, kind: SymbolKind) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            qualified_name: name.clone(),
            name,
            kind,
            location: SourceLocation::default(),
            visibility: Visibility::Public,
            flags: SymbolFlags::default(),
            raw_metrics: RawMetrics::default(),
            parent: None,
            signature: None,
        }
    }

    pub fn with_raw_metrics(mut self, raw_metrics: RawMetrics) -> Self {
        self.raw_metrics = raw_metrics;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<SymbolId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_flags(mut self, flags: SymbolFlags) -> Self {
        self.flags = flags;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    Import,
    Inherits,
    Implements,
    References,
    Composes,
    Uses,
}

impl DependencyKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Inherits => "inherits",
            Self::Implements => "implements",
            Self::References => "references",
            Self::Composes => "composes",
            Self::Uses => "uses",
        }
    }
}

/// Edge flags. `is_circular` is a projection owned by the cycle detector:
/// values supplied at ingestion are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct EdgeFlags {
    pub is_circular: bool,
    pub is_external: bool,
    pub is_conditional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub source: SymbolId,
    pub target: SymbolId,
    pub kind: DependencyKind,
    pub context: Site,
    /// Resolution confidence in [0, 1].
    pub confidence: f64,
    pub weight: f64,
    pub flags: EdgeFlags,
}

impl DependencyEdge {
    pub fn new(source: impl Into<SymbolId>, target: impl Into<SymbolId>, kind: DependencyKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            context: Site::default(),
            confidence: 1.0,
            weight: 1.0,
            flags: EdgeFlags::default(),
        }
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.context.line = line;
        self
    }

    pub fn key(&self) -> DependencyKey {
        DependencyKey {
            source: self.source,
            target: self.target,
            kind: self.kind,
            line: self.context.line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Direct,
    Indirect,
    Virtual,
    Recursive,
}

impl CallKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Indirect => "indirect",
            Self::Virtual => "virtual",
            Self::Recursive => "recursive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller: SymbolId,
    pub callee: SymbolId,
    pub call_site: Site,
    pub kind: CallKind,
    /// Observed or estimated number of calls through this site.
    pub frequency: u64,
    /// Probability in [0, 1] that the call executes when the caller runs.
    pub execution_probability: f64,
}

impl CallEdge {
    pub fn new(caller: impl Into<SymbolId>, callee: impl Into<SymbolId>) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
            call_site: Site::default(),
            kind: CallKind::Direct,
            frequency: 1,
            execution_probability: 1.0,
        }
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.call_site.line = line;
        self
    }

    pub fn with_frequency(mut self, frequency: u64) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.execution_probability = probability;
        self
    }

    pub fn key(&self) -> CallKey {
        CallKey {
            caller: self.caller,
            callee: self.callee,
            line: self.call_site.line,
        }
    }
}

/// Uniqueness key: (source, target, kind, context line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyKey {
    pub source: SymbolId,
    pub target: SymbolId,
    pub kind: DependencyKind,
    pub line: u32,
}

/// Uniqueness key: (caller, callee, call-site line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CallKey {
    pub caller: SymbolId,
    pub callee: SymbolId,
    pub line: u32,
}

/// Key of any edge held by the fact store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeKey {
    Dependency(DependencyKey),
    Call(CallKey),
}

/// Which edge family a graph operation walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Dependency,
    Call,
}

impl EdgeType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dependency => "dependency",
            Self::Call => "call",
        }
    }
}
