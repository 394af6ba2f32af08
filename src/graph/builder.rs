//
//  builder.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

use rayon::prelude::*;
use tracing::{info, warn};

use super::flow::FlowAnalyzer;
use super::hierarchy::{HierarchyBuilder, HierarchyFragment};
use super::integration::IntegrationExtractor;
use super::table::SymbolTable;
use super::types::*;
use crate::discovery::Discovery;
use crate::error::Result;
use crate::parser::{parse_file, relative_path, ParsedFile};
use crate::IntegrationMap;

/// Run both traversal passes and the aggregate pass over discovered files.
///
/// Per-file work runs in parallel; every merge happens on this thread in
/// discovery order, so the result does not depend on scheduling.
pub fn build_map(discovery: &Discovery) -> IntegrationMap {
    let root = discovery.root.as_path();
    let mut diagnostics = discovery.diagnostics.clone();
    let mut files_failed = 0;

    // Phase 1: parse + hierarchy, per file.
    let parsed: Vec<Result<(ParsedFile, HierarchyFragment)>> = discovery
        .files
        .par_iter()
        .map(|path| {
            let file = parse_file(root, path)?;
            let fragment = HierarchyBuilder::build(&file);
            Ok((file, fragment))
        })
        .collect();

    let mut table = SymbolTable::new();
    let mut accepted: Vec<ParsedFile> = Vec::with_capacity(parsed.len());
    for (path, result) in discovery.files.iter().zip(parsed) {
        match result {
            Ok((file, fragment)) => {
                diagnostics.extend(fragment.diagnostics);
                let outcome = table.merge_fragment(fragment.table, &file.relative);
                diagnostics.extend(outcome.diagnostics);
                if outcome.accepted {
                    accepted.push(file);
                } else {
                    warn!(file = %file.relative, "module collides with an existing symbol, skipping file");
                    files_failed += 1;
                }
            }
            Err(e) => {
                let relative = relative_path(root, path);
                warn!(file = %relative, error = %e, "skipping file");
                diagnostics.push(Diagnostic::parse_failure(
                    &relative,
                    Phase::Hierarchy,
                    e.to_string(),
                ));
                files_failed += 1;
            }
        }
    }
    info!(
        files = accepted.len(),
        failed = files_failed,
        symbols = table.len(),
        "symbol table built"
    );

    // Phase 2: integration edges against the complete table.
    let fragments: Vec<_> = accepted
        .par_iter()
        .map(|file| IntegrationExtractor::extract(file, &table))
        .collect();

    let mut edges = Vec::new();
    let mut call_graph = CallGraph::new();
    for fragment in fragments {
        edges.extend(fragment.edges);
        call_graph.extend(fragment.call_graph);
        diagnostics.extend(fragment.diagnostics);
    }
    info!(edges = edges.len(), callees = call_graph.len(), "integration edges extracted");

    // Phase 3: aggregate analysis.
    let flow = FlowAnalyzer::new(&table, &edges, &call_graph).analyze();

    let summary = Summary {
        files_discovered: discovery.files.len(),
        files_analyzed: accepted.len(),
        files_failed,
        components_found: table.len(),
        total_integration_points: edges.len(),
        total_crossroads: flow.crossroads.len(),
        total_critical_paths: flow.critical_paths.len(),
        analysis_timestamp: chrono::Utc::now().to_rfc3339(),
    };
    info!(
        components = summary.components_found,
        crossroads = summary.total_crossroads,
        critical_paths = summary.total_critical_paths,
        diagnostics = diagnostics.len(),
        "integration map built"
    );

    IntegrationMap {
        symbols: table,
        edges,
        crossroads: flow.crossroads,
        critical_paths: flow.critical_paths,
        summary,
        diagnostics,
    }
}
