//
//  types.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ─── Symbols ────────────────────────────────────────────────────

/// Kind of a symbol-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Package,
    Module,
    Class,
    Function,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Package => "package",
            SymbolKind::Module => "module",
            SymbolKind::Class => "class",
            SymbolKind::Function => "function",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive 1-based line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Synthetic range used for a module's own node.
    pub fn module() -> Self {
        Self { start: 1, end: 1 }
    }
}

/// A named reference from a parent entry to a child FQN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef {
    pub name: String,
    pub fqn: String,
}

impl ChildRef {
    pub fn new(name: impl Into<String>, fqn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fqn: fqn.into(),
        }
    }
}

/// A class attribute and the line it is first assigned on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassAttribute {
    pub name: String,
    pub line: usize,
}

/// Class-specific metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassInfo {
    /// Raw base expressions (`Base`, `models.Model`), unresolved.
    pub bases: Vec<String>,
    pub methods: Vec<ChildRef>,
    pub attributes: Vec<ClassAttribute>,
}

impl ClassInfo {
    /// Record an attribute; the first assignment wins.
    pub fn add_attribute(&mut self, name: &str, line: usize) {
        if !self.attributes.iter().any(|a| a.name == name) {
            self.attributes.push(ClassAttribute {
                name: name.to_string(),
                line,
            });
        }
    }
}

/// Where a function is defined relative to its immediate enclosing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionScope {
    /// Immediate enclosing scope is a class.
    Method,
    /// Immediate enclosing scope is the module.
    ModuleLevel,
    /// Defined inside another function.
    Nested,
}

impl FunctionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionScope::Method => "method",
            FunctionScope::ModuleLevel => "module_level",
            FunctionScope::Nested => "nested",
        }
    }
}

/// Function-specific metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub parameters: Vec<String>,
    pub scope: FunctionScope,
    pub is_async: bool,
}

impl FunctionInfo {
    pub fn is_method(&self) -> bool {
        self.scope == FunctionScope::Method
    }
}

/// Kind-specific payload of a [`SymbolEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolDetail {
    Package,
    Module,
    Class(ClassInfo),
    Function(FunctionInfo),
}

/// One row of the symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub fqn: String,
    /// Local name (last FQN segment).
    pub name: String,
    pub parent: Option<String>,
    pub line_range: Option<LineRange>,
    /// Owning file, relative to the analyzed root.
    pub path: Option<String>,
    pub docstring: Option<String>,
    /// Every direct child, in registration order.
    pub children: Vec<ChildRef>,
    pub detail: SymbolDetail,
}

impl SymbolEntry {
    fn bare(fqn: &str, detail: SymbolDetail) -> Self {
        let (parent, name) = split_fqn(fqn);
        Self {
            fqn: fqn.to_string(),
            name: name.to_string(),
            parent: parent.map(str::to_string),
            line_range: None,
            path: None,
            docstring: None,
            children: Vec::new(),
            detail,
        }
    }

    /// Synthesized package entry: no metadata besides its children.
    pub fn package(fqn: &str) -> Self {
        Self::bare(fqn, SymbolDetail::Package)
    }

    pub fn module(fqn: &str, path: &str, docstring: Option<String>) -> Self {
        Self {
            line_range: Some(LineRange::module()),
            path: Some(path.to_string()),
            docstring,
            ..Self::bare(fqn, SymbolDetail::Module)
        }
    }

    pub fn class(
        fqn: &str,
        path: &str,
        line_range: LineRange,
        docstring: Option<String>,
        bases: Vec<String>,
    ) -> Self {
        let info = ClassInfo {
            bases,
            ..ClassInfo::default()
        };
        Self {
            line_range: Some(line_range),
            path: Some(path.to_string()),
            docstring,
            ..Self::bare(fqn, SymbolDetail::Class(info))
        }
    }

    pub fn function(
        fqn: &str,
        path: &str,
        line_range: LineRange,
        docstring: Option<String>,
        info: FunctionInfo,
    ) -> Self {
        Self {
            line_range: Some(line_range),
            path: Some(path.to_string()),
            docstring,
            ..Self::bare(fqn, SymbolDetail::Function(info))
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self.detail {
            SymbolDetail::Package => SymbolKind::Package,
            SymbolDetail::Module => SymbolKind::Module,
            SymbolDetail::Class(_) => SymbolKind::Class,
            SymbolDetail::Function(_) => SymbolKind::Function,
        }
    }

    pub fn is_package(&self) -> bool {
        matches!(self.detail, SymbolDetail::Package)
    }

    /// Register a child. Re-registering the same local name is a no-op.
    pub fn add_child(&mut self, name: &str, fqn: &str) {
        if !self.children.iter().any(|c| c.name == name) {
            self.children.push(ChildRef::new(name, fqn));
        }
    }

    pub fn class_info(&self) -> Option<&ClassInfo> {
        match &self.detail {
            SymbolDetail::Class(info) => Some(info),
            _ => None,
        }
    }

    pub fn class_info_mut(&mut self) -> Option<&mut ClassInfo> {
        match &mut self.detail {
            SymbolDetail::Class(info) => Some(info),
            _ => None,
        }
    }

    pub fn function_info(&self) -> Option<&FunctionInfo> {
        match &self.detail {
            SymbolDetail::Function(info) => Some(info),
            _ => None,
        }
    }
}

/// Split `a.b.c` into (`Some("a.b")`, `"c"`).
pub fn split_fqn(fqn: &str) -> (Option<&str>, &str) {
    match fqn.rsplit_once('.') {
        Some((parent, name)) => (Some(parent), name),
        None => (None, fqn),
    }
}

/// Leading (top-level) segment of a dotted name.
pub fn top_level(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

// ─── Edges ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Import,
    Call,
    Attribute,
    Inheritance,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Import => "import",
            EdgeKind::Call => "call",
            EdgeKind::Attribute => "attribute",
            EdgeKind::Inheritance => "inheritance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportForm {
    /// `import x` / `import x as y`
    ImportModule,
    /// `from m import a, b`
    ImportFrom,
}

impl ImportForm {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportForm::ImportModule => "import_module",
            ImportForm::ImportFrom => "import_from",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeAccess {
    Read,
    Write,
}

impl AttributeAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeAccess::Read => "read",
            AttributeAccess::Write => "write",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Positional,
    Keyword,
}

impl ArgumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgumentKind::Positional => "positional",
            ArgumentKind::Keyword => "keyword",
        }
    }
}

/// One call-site argument, kept as literal source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArgument {
    pub kind: ArgumentKind,
    /// Parameter name for keyword arguments; `None` for `**kwargs` splats.
    pub name: Option<String>,
    pub value: String,
}

impl CallArgument {
    pub fn positional(value: impl Into<String>) -> Self {
        Self {
            kind: ArgumentKind::Positional,
            name: None,
            value: value.into(),
        }
    }

    pub fn keyword(name: Option<String>, value: impl Into<String>) -> Self {
        Self {
            kind: ArgumentKind::Keyword,
            name,
            value: value.into(),
        }
    }
}

/// Callee identifier recorded for calls that cannot be resolved statically.
pub const DYNAMIC_CALLEE: &str = "<dynamic_call>";

/// Best-effort static resolution of a call target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// A symbol-table FQN.
    Resolved(String),
    /// A name outside the indexed table (stdlib, third party, `self.x`).
    External(String),
    /// Computed callee: subscript result, call result, lambda, ...
    Unresolved,
}

impl CallTarget {
    pub fn name(&self) -> Option<&str> {
        match self {
            CallTarget::Resolved(name) | CallTarget::External(name) => Some(name),
            CallTarget::Unresolved => None,
        }
    }

    /// Key used in the call graph.
    pub fn callee_id(&self) -> &str {
        self.name().unwrap_or(DYNAMIC_CALLEE)
    }

    pub fn resolution(&self) -> &'static str {
        match self {
            CallTarget::Resolved(_) => "resolved",
            CallTarget::External(_) => "external",
            CallTarget::Unresolved => "unresolved",
        }
    }
}

/// Kind-specific payload of an [`Edge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDetail {
    Import {
        target: String,
        form: ImportForm,
        items: Vec<String>,
    },
    Call {
        target: CallTarget,
        args: Vec<CallArgument>,
    },
    Attribute {
        target: String,
        access: AttributeAccess,
    },
    Inheritance {
        bases: Vec<String>,
    },
}

/// A recorded relationship between a source FQN and a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub line: usize,
    pub detail: EdgeDetail,
}

impl Edge {
    pub fn kind(&self) -> EdgeKind {
        match self.detail {
            EdgeDetail::Import { .. } => EdgeKind::Import,
            EdgeDetail::Call { .. } => EdgeKind::Call,
            EdgeDetail::Attribute { .. } => EdgeKind::Attribute,
            EdgeDetail::Inheritance { .. } => EdgeKind::Inheritance,
        }
    }

    /// Single target name, if this edge has one.
    /// Inheritance edges carry a list and unresolved calls carry none.
    pub fn target(&self) -> Option<&str> {
        match &self.detail {
            EdgeDetail::Import { target, .. } | EdgeDetail::Attribute { target, .. } => {
                Some(target)
            }
            EdgeDetail::Call { target, .. } => target.name(),
            EdgeDetail::Inheritance { .. } => None,
        }
    }
}

// ─── Call graph ─────────────────────────────────────────────────

/// Ordered multimap: callee → caller FQNs, one entry per call site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallGraph {
    callees: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, callee: &str, caller: &str) {
        let slot = match self.index.get(callee) {
            Some(&slot) => slot,
            None => {
                self.callees.push((callee.to_string(), Vec::new()));
                self.index.insert(callee.to_string(), self.callees.len() - 1);
                self.callees.len() - 1
            }
        };
        self.callees[slot].1.push(caller.to_string());
    }

    /// Append another graph's entries, keeping first-seen callee order.
    pub fn extend(&mut self, other: CallGraph) {
        for (callee, callers) in other.callees {
            for caller in callers {
                self.record(&callee, &caller);
            }
        }
    }

    pub fn callers(&self, callee: &str) -> &[String] {
        self.index
            .get(callee)
            .map(|&slot| self.callees[slot].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn fan_in(&self, callee: &str) -> usize {
        self.callers(callee).len()
    }

    /// Callees with their caller lists, in first-recorded order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.callees
            .iter()
            .map(|(callee, callers)| (callee.as_str(), callers.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.callees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callees.is_empty()
    }
}

// ─── Analysis results ───────────────────────────────────────────

/// Two-level rating used for crossroad criticality and path complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// A pair of top-level modules with significant cross traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crossroad {
    pub id: String,
    /// Sorted pair of top-level module identifiers.
    pub components: [String; 2],
    pub integration_count: usize,
    pub criticality: Severity,
}

/// A callee ranked among the highest fan-in targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPath {
    pub id: String,
    pub callee: String,
    pub fan_in: usize,
    pub complexity: Severity,
}

/// Summary counts reported with every map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub files_discovered: usize,
    /// Files that parsed and contributed to the map.
    pub files_analyzed: usize,
    pub files_failed: usize,
    pub components_found: usize,
    pub total_integration_points: usize,
    pub total_crossroads: usize,
    pub total_critical_paths: usize,
    pub analysis_timestamp: String,
}

/// Pipeline stage a diagnostic was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Discovery,
    Hierarchy,
    Integration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    ParseFailure,
    StructuralInconsistency,
}

/// A per-file condition absorbed by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub path: String,
    pub phase: Phase,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn parse_failure(path: &str, phase: Phase, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            phase,
            kind: DiagnosticKind::ParseFailure,
            message: message.into(),
        }
    }

    pub fn structural(path: &str, phase: Phase, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            phase,
            kind: DiagnosticKind::StructuralInconsistency,
            message: message.into(),
        }
    }
}
