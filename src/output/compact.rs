//
//  compact.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

//! ID-based rendering for token-constrained consumers.
//!
//! FQNs are replaced by integer IDs from the `idx` section, keys are
//! abbreviated (see [`super::codes`]) and edges become positional arrays:
//!
//! ```text
//! [sourceId, targetId | -1, typeCode, line, externalText?, payload?]
//! ```
//!
//! A `-1` target followed by a string names a target outside the symbol
//! table. A `-1` target without text is an unresolved call, or an
//! inheritance edge whose bases live in the payload.

use serde_json::{json, Map, Value};

use super::codes::{self, EdgeCode};
use super::indexer::ComponentIndexer;
use crate::graph::types::*;
use crate::IntegrationMap;

/// Render a map in the compact layout.
pub fn encode(map: &IntegrationMap) -> Value {
    let mut indexer = ComponentIndexer::new();
    // Every symbol gets its ID before any edge is looked at.
    for entry in map.symbols.iter() {
        indexer.get_or_create_id(&entry.fqn);
    }

    let components: Vec<Value> = map
        .symbols
        .iter()
        .map(|entry| component(&mut indexer, entry))
        .collect();
    let edges: Vec<Value> = map.edges.iter().map(|e| edge(&mut indexer, e)).collect();
    let crossroads: Vec<Value> = map
        .crossroads
        .iter()
        .map(|c| {
            json!([
                reference(&indexer, &c.components[0]),
                reference(&indexer, &c.components[1]),
                c.integration_count,
                codes::severity_code(c.criticality),
            ])
        })
        .collect();
    let critical_paths: Vec<Value> = map
        .critical_paths
        .iter()
        .map(|p| {
            json!([
                reference(&indexer, &p.callee),
                p.fan_in,
                codes::severity_code(p.complexity),
            ])
        })
        .collect();
    let diagnostics: Vec<Value> = map
        .diagnostics
        .iter()
        .map(|d| {
            json!([
                d.path,
                codes::phase_code(d.phase),
                codes::diagnostic_code(d.kind),
                d.message,
            ])
        })
        .collect();

    let mut output = Map::new();
    output.insert(codes::VERSION.into(), json!(codes::FORMAT_VERSION));
    output.insert(codes::INDEX.into(), indexer.to_json_index());
    output.insert(codes::METADATA.into(), metadata(&map.summary));
    output.insert(codes::COMPONENTS.into(), Value::Array(components));
    output.insert(codes::EDGES.into(), Value::Array(edges));
    output.insert(codes::CROSSROADS.into(), Value::Array(crossroads));
    output.insert(codes::CRITICAL_PATHS.into(), Value::Array(critical_paths));
    output.insert(codes::DIAGNOSTICS.into(), Value::Array(diagnostics));
    Value::Object(output)
}

fn metadata(summary: &Summary) -> Value {
    let mut md = Map::new();
    md.insert(codes::MD_FILES_DISCOVERED.into(), json!(summary.files_discovered));
    md.insert(codes::MD_FILES_ANALYZED.into(), json!(summary.files_analyzed));
    md.insert(codes::MD_FILES_FAILED.into(), json!(summary.files_failed));
    md.insert(codes::MD_COMPONENTS_FOUND.into(), json!(summary.components_found));
    md.insert(
        codes::MD_INTEGRATION_POINTS.into(),
        json!(summary.total_integration_points),
    );
    md.insert(codes::MD_CROSSROADS.into(), json!(summary.total_crossroads));
    md.insert(
        codes::MD_CRITICAL_PATHS.into(),
        json!(summary.total_critical_paths),
    );
    md.insert(codes::MD_TIMESTAMP.into(), json!(summary.analysis_timestamp));
    Value::Object(md)
}

fn component(indexer: &mut ComponentIndexer, entry: &SymbolEntry) -> Value {
    let mut cmp = Map::new();
    cmp.insert(codes::CMP_ID.into(), json!(indexer.get_or_create_id(&entry.fqn)));
    cmp.insert(codes::CMP_TYPE.into(), json!(codes::kind_code(entry)));
    if let Some(range) = entry.line_range {
        cmp.insert(codes::CMP_LINES.into(), json!([range.start, range.end]));
    }
    if let Some(path) = &entry.path {
        cmp.insert(codes::CMP_PATH.into(), json!(path));
    }
    if let Some(doc) = &entry.docstring {
        cmp.insert(codes::CMP_DOC.into(), json!(doc));
    }
    if !entry.children.is_empty() {
        let ids: Vec<u64> = entry
            .children
            .iter()
            .map(|c| indexer.get_or_create_id(&c.fqn))
            .collect();
        cmp.insert(codes::CMP_CHILDREN.into(), json!(ids));
    }

    match &entry.detail {
        SymbolDetail::Class(info) => {
            if !info.bases.is_empty() {
                cmp.insert(codes::CMP_BASES.into(), json!(info.bases));
            }
            if !info.methods.is_empty() {
                let ids: Vec<u64> = info
                    .methods
                    .iter()
                    .map(|m| indexer.get_or_create_id(&m.fqn))
                    .collect();
                cmp.insert(codes::CMP_METHODS.into(), json!(ids));
            }
            if !info.attributes.is_empty() {
                let attributes: Vec<Value> = info
                    .attributes
                    .iter()
                    .map(|a| json!([a.name, a.line]))
                    .collect();
                cmp.insert(codes::CMP_ATTRIBUTES.into(), Value::Array(attributes));
            }
        }
        SymbolDetail::Function(info) => {
            if !info.parameters.is_empty() {
                cmp.insert(codes::CMP_PARAMETERS.into(), json!(info.parameters));
            }
            if info.is_async {
                cmp.insert(codes::CMP_ASYNC.into(), json!(true));
            }
        }
        SymbolDetail::Package | SymbolDetail::Module => {}
    }

    Value::Object(cmp)
}

fn edge(indexer: &mut ComponentIndexer, edge: &Edge) -> Value {
    let source = indexer.get_or_create_id(&edge.source);
    let mut array = vec![
        json!(source),
        json!(codes::NO_TARGET),
        json!(EdgeCode::of(edge).as_str()),
        json!(edge.line),
    ];
    let mut payload = Map::new();

    match &edge.detail {
        EdgeDetail::Import { target, items, .. } => {
            place_target(indexer, &mut array, target);
            if !items.is_empty() {
                payload.insert(codes::EDGE_ITEMS.into(), json!(items));
            }
        }
        EdgeDetail::Call { target, args } => {
            match target {
                CallTarget::Resolved(fqn) => array[1] = json!(indexer.get_or_create_id(fqn)),
                CallTarget::External(name) => array.push(json!(name)),
                CallTarget::Unresolved => {}
            }
            if !args.is_empty() {
                let args: Vec<Value> = args.iter().map(argument).collect();
                payload.insert(codes::EDGE_ARGS.into(), Value::Array(args));
            }
        }
        EdgeDetail::Attribute { target, .. } => place_target(indexer, &mut array, target),
        EdgeDetail::Inheritance { bases } => {
            payload.insert(codes::EDGE_BASES.into(), json!(bases));
        }
    }

    if !payload.is_empty() {
        array.push(Value::Object(payload));
    }
    Value::Array(array)
}

/// Indexed targets go in slot 1; anything else is appended as text.
fn place_target(indexer: &ComponentIndexer, array: &mut Vec<Value>, target: &str) {
    match indexer.id_of(target) {
        Some(id) => array[1] = json!(id),
        None => array.push(json!(target)),
    }
}

/// Positional arguments are bare strings, keyword arguments `[name, value]`.
fn argument(arg: &CallArgument) -> Value {
    match arg.kind {
        ArgumentKind::Positional => json!(arg.value),
        ArgumentKind::Keyword => json!([arg.name, arg.value]),
    }
}

/// An ID when the name is indexed, the name itself otherwise.
fn reference(indexer: &ComponentIndexer, name: &str) -> Value {
    match indexer.id_of(name) {
        Some(id) => json!(id),
        None => json!(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::table::SymbolTable;

    fn map_with(edges: Vec<Edge>) -> IntegrationMap {
        let mut symbols = SymbolTable::new();
        let mut a = SymbolEntry::module("a", "a.py", None);
        a.add_child("f", "a.f");
        let f = SymbolEntry::function(
            "a.f",
            "a.py",
            LineRange::new(1, 2),
            None,
            FunctionInfo {
                parameters: vec![],
                scope: FunctionScope::ModuleLevel,
                is_async: false,
            },
        );
        for entry in [a, f, SymbolEntry::module("b", "b.py", None)] {
            assert!(symbols.insert(entry));
        }
        IntegrationMap {
            symbols,
            edges,
            ..IntegrationMap::default()
        }
    }

    #[test]
    fn test_symbols_are_indexed_in_table_order() {
        let encoded = encode(&map_with(vec![]));
        assert_eq!(encoded["v"], 1);
        assert_eq!(encoded["idx"], json!({"1": "a", "2": "a.f", "3": "b"}));
        assert_eq!(encoded["cmp"][0], json!({"i": 1, "t": "mo", "l": [1, 1], "pa": "a.py", "c": [2]}));
        assert_eq!(encoded["cmp"][1]["t"], "f");
    }

    #[test]
    fn test_edge_arrays() {
        let edges = vec![
            Edge {
                source: "b".into(),
                line: 1,
                detail: EdgeDetail::Import {
                    target: "a".into(),
                    form: ImportForm::ImportModule,
                    items: vec!["a".into()],
                },
            },
            Edge {
                source: "b".into(),
                line: 2,
                detail: EdgeDetail::Import {
                    target: "os".into(),
                    form: ImportForm::ImportFrom,
                    items: vec!["path".into()],
                },
            },
            Edge {
                source: "b".into(),
                line: 3,
                detail: EdgeDetail::Call {
                    target: CallTarget::Resolved("a.f".into()),
                    args: vec![
                        CallArgument::positional("1"),
                        CallArgument::keyword(Some("k".into()), "v"),
                    ],
                },
            },
            Edge {
                source: "b".into(),
                line: 4,
                detail: EdgeDetail::Call {
                    target: CallTarget::Unresolved,
                    args: vec![],
                },
            },
            Edge {
                source: "b".into(),
                line: 5,
                detail: EdgeDetail::Attribute {
                    target: "self.x".into(),
                    access: AttributeAccess::Write,
                },
            },
            Edge {
                source: "b".into(),
                line: 6,
                detail: EdgeDetail::Inheritance {
                    bases: vec!["a.Base".into()],
                },
            },
        ];
        let encoded = encode(&map_with(edges));
        assert_eq!(
            encoded["edg"],
            json!([
                [3, 1, "im", 1, {"it": ["a"]}],
                [3, -1, "imf", 2, "os", {"it": ["path"]}],
                [3, 2, "c", 3, {"a": ["1", ["k", "v"]]}],
                [3, -1, "c", 4],
                [3, -1, "aw", 5, "self.x"],
                [3, -1, "in", 6, {"b": ["a.Base"]}],
            ])
        );
    }
}
