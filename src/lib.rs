//! # Integration Map
//!
//! Static integration graph for Python codebases.
//!
//! Every `.py` file under a root is parsed once with tree-sitter and walked
//! twice: first to build an FQN-keyed symbol table of packages, modules,
//! classes and functions, then to record how those symbols integrate
//! (imports, calls, attribute access, inheritance). A final aggregate pass
//! finds *crossroads* (top-level module pairs with heavy cross traffic) and
//! *critical paths* (the callees with the highest fan-in).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integration_map::{map_codebase, MapOptions, output};
//!
//! let map = map_codebase("./my_project", &MapOptions::default()).unwrap();
//! println!("{} symbols, {} edges", map.symbols.len(), map.edges.len());
//!
//! // Token-efficient form for tools, and back again.
//! let compact = output::encode(&map);
//! let decoded = output::decode_compact(&compact).unwrap();
//! assert_eq!(decoded.edges, map.edges);
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod output;
pub mod parser;

// Re-exports for convenience
pub use config::MapperConfig;
pub use discovery::{discover, Discovery};
pub use error::{MapperError, Result};
pub use graph::table::SymbolTable;
pub use graph::types::{CallGraph, CriticalPath, Crossroad, Diagnostic, Edge, EdgeDetail, Summary};
pub use output::OutputFormat;

use std::path::Path;
use tracing::info;

/// The complete result of one analysis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrationMap {
    pub symbols: SymbolTable,
    /// Edges grouped by file in discovery order, source order within a file.
    pub edges: Vec<Edge>,
    pub crossroads: Vec<Crossroad>,
    pub critical_paths: Vec<CriticalPath>,
    pub summary: Summary,
    /// Per-file conditions absorbed during the run.
    pub diagnostics: Vec<Diagnostic>,
}

impl IntegrationMap {
    /// Callee → callers multimap rebuilt from the call edges.
    pub fn call_graph(&self) -> CallGraph {
        let mut calls = CallGraph::new();
        for edge in &self.edges {
            if let EdgeDetail::Call { target, .. } = &edge.detail {
                calls.record(target.callee_id(), &edge.source);
            }
        }
        calls
    }
}

/// Options for [`map_codebase`].
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    /// Glob patterns excluded from discovery, relative to the root.
    pub excludes: Vec<String>,
}

/// Analyze every Python file under `root`.
///
/// Fails only when the root is missing, holds no Python sources, or an
/// exclusion pattern is invalid. Everything that goes wrong inside a single
/// file is reported in [`IntegrationMap::diagnostics`] instead.
pub fn map_codebase<P: AsRef<Path>>(root: P, options: &MapOptions) -> Result<IntegrationMap> {
    let root = root.as_ref();
    info!(root = %root.display(), "mapping codebase");
    let discovery = discover(root, &options.excludes)?;
    Ok(graph::build_map(&discovery))
}
