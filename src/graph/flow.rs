//
//  flow.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

use petgraph::graphmap::UnGraphMap;
use tracing::debug;

use super::table::SymbolTable;
use super::types::*;

/// Minimum cross-module edge count for a pair to be a crossroad.
pub const CROSSROAD_MIN_INTEGRATIONS: usize = 3;
/// Crossroads above this count are rated high.
pub const CROSSROAD_HIGH_ABOVE: usize = 10;
/// Critical paths above this fan-in are rated high.
pub const CRITICAL_PATH_HIGH_ABOVE: usize = 5;
pub const CRITICAL_PATH_LIMIT: usize = 5;
pub const CRITICAL_PATH_MIN_FAN_IN: usize = 2;

/// Result of the aggregate pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowAnalysis {
    pub crossroads: Vec<Crossroad>,
    pub critical_paths: Vec<CriticalPath>,
}

/// Aggregate pass over the complete edge set. Runs once, after every file
/// has gone through both traversal passes.
pub struct FlowAnalyzer<'a> {
    table: &'a SymbolTable,
    edges: &'a [Edge],
    call_graph: &'a CallGraph,
}

impl<'a> FlowAnalyzer<'a> {
    pub fn new(table: &'a SymbolTable, edges: &'a [Edge], call_graph: &'a CallGraph) -> Self {
        Self {
            table,
            edges,
            call_graph,
        }
    }

    pub fn analyze(&self) -> FlowAnalysis {
        let analysis = FlowAnalysis {
            crossroads: self.crossroads(),
            critical_paths: self.critical_paths(),
        };
        debug!(
            crossroads = analysis.crossroads.len(),
            critical_paths = analysis.critical_paths.len(),
            "flow analysis complete"
        );
        analysis
    }

    /// Pairs of top-level modules joined by at least
    /// [`CROSSROAD_MIN_INTEGRATIONS`] single-target edges.
    pub fn crossroads(&self) -> Vec<Crossroad> {
        let modules = self.table.top_level_names();
        let mut traffic: UnGraphMap<&str, usize> = UnGraphMap::new();

        for edge in self.edges {
            // Inheritance and unresolved calls have no single target.
            let Some(target) = edge.target() else {
                continue;
            };
            let from = top_level(&edge.source);
            let to = top_level(target);
            // Both ends must be analyzed top-level modules, so traffic into
            // `os` or other third-party roots never forms a crossroad.
            if from == to || !modules.contains(to) {
                continue;
            }
            match traffic.edge_weight_mut(from, to) {
                Some(count) => *count += 1,
                None => {
                    traffic.add_edge(from, to, 1);
                }
            }
        }

        let mut crossroads: Vec<Crossroad> = traffic
            .all_edges()
            .filter(|(_, _, count)| **count >= CROSSROAD_MIN_INTEGRATIONS)
            .map(|(a, b, &count)| {
                let (first, second) = if a <= b { (a, b) } else { (b, a) };
                Crossroad {
                    id: format!("{first}_{second}_junction"),
                    components: [first.to_string(), second.to_string()],
                    integration_count: count,
                    criticality: if count > CROSSROAD_HIGH_ABOVE {
                        Severity::High
                    } else {
                        Severity::Medium
                    },
                }
            })
            .collect();

        crossroads.sort_by(|a, b| b.integration_count.cmp(&a.integration_count));
        crossroads
    }

    /// The highest fan-in callees, at most [`CRITICAL_PATH_LIMIT`].
    pub fn critical_paths(&self) -> Vec<CriticalPath> {
        let mut ranked: Vec<(&str, usize)> = self
            .call_graph
            .iter()
            .map(|(callee, callers)| (callee, callers.len()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        ranked
            .into_iter()
            .take(CRITICAL_PATH_LIMIT)
            .filter(|&(_, fan_in)| fan_in >= CRITICAL_PATH_MIN_FAN_IN)
            .map(|(callee, fan_in)| CriticalPath {
                id: format!("path_{}", callee.replace('.', "_")),
                callee: callee.to_string(),
                fan_in,
                complexity: if fan_in > CRITICAL_PATH_HIGH_ABOVE {
                    Severity::High
                } else {
                    Severity::Medium
                },
            })
            .collect()
    }
}
