//! Integration graph: the symbol table, edge extraction, and aggregate
//! flow analysis.
//!
//! Three passes run over every file:
//! 1. [`hierarchy`] registers packages, modules, classes and functions.
//! 2. [`integration`] records imports, calls, attribute access and
//!    inheritance against the complete table.
//! 3. [`flow`] derives crossroads and critical paths from the edges.
//!
//! [`builder`] drives all three.

pub mod builder;
pub mod flow;
pub mod hierarchy;
pub mod integration;
pub mod scope;
pub mod table;
pub mod types;

pub use builder::build_map;
pub use flow::{FlowAnalysis, FlowAnalyzer};
pub use hierarchy::{HierarchyBuilder, HierarchyFragment};
pub use integration::{IntegrationExtractor, IntegrationFragment};
pub use table::{MergeOutcome, SymbolTable};
pub use types::{
    CallArgument, CallGraph, CallTarget, CriticalPath, Crossroad, Diagnostic, DiagnosticKind,
    Edge, EdgeDetail, EdgeKind, Phase, Severity, Summary, SymbolEntry, SymbolKind,
};
