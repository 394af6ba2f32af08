//
//  verbose.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

//! Full-detail rendering: a nested tree of every symbol plus complete
//! edge objects. Readable by humans, large for tools.

use serde_json::{json, Map, Value};

use crate::graph::table::SymbolTable;
use crate::graph::types::*;
use crate::IntegrationMap;

/// Render a map in the verbose layout.
pub fn render(map: &IntegrationMap) -> Value {
    let edges: Vec<Value> = map.edges.iter().map(edge_value).collect();
    json!({
        "metadata": map.summary,
        "codebase_tree": codebase_tree(&map.symbols),
        "global_integration_map": {
            "crossroads": map.crossroads,
            "critical_paths": map.critical_paths,
            "data_flows": [],
            "statistics": statistics(map),
        },
        "integration_edges": edges,
        "diagnostics": map.diagnostics,
    })
}

/// Root entries keyed by local name, each with its subtree.
pub fn codebase_tree(table: &SymbolTable) -> Value {
    let mut tree = Map::new();
    for root in table.roots() {
        tree.insert(root.name.clone(), node_value(table, root));
    }
    Value::Object(tree)
}

fn node_value(table: &SymbolTable, entry: &SymbolEntry) -> Value {
    let mut node = Map::new();
    node.insert("type".into(), json!(entry.kind()));
    node.insert("fqn".into(), json!(entry.fqn));
    node.insert("name".into(), json!(entry.name));
    if let Some(range) = entry.line_range {
        node.insert("line_range".into(), json!([range.start, range.end]));
    }
    if let Some(path) = &entry.path {
        node.insert("path".into(), json!(path));
    }
    if let Some(doc) = &entry.docstring {
        node.insert("docstring".into(), json!(doc));
    }

    match &entry.detail {
        SymbolDetail::Class(info) => {
            node.insert("bases".into(), json!(info.bases));
            let methods: Map<String, Value> = info
                .methods
                .iter()
                .map(|m| (m.name.clone(), json!(m.fqn)))
                .collect();
            node.insert("methods".into(), Value::Object(methods));
            let attributes: Map<String, Value> = info
                .attributes
                .iter()
                .map(|a| (a.name.clone(), json!(a.line)))
                .collect();
            node.insert("attributes".into(), Value::Object(attributes));
        }
        SymbolDetail::Function(info) => {
            node.insert("parameters".into(), json!(info.parameters));
            node.insert("scope".into(), json!(info.scope.as_str()));
            node.insert("is_async".into(), json!(info.is_async));
        }
        SymbolDetail::Package | SymbolDetail::Module => {}
    }

    let children: Map<String, Value> = entry
        .children
        .iter()
        .filter_map(|child| {
            table
                .get(&child.fqn)
                .map(|c| (child.name.clone(), node_value(table, c)))
        })
        .collect();
    node.insert("children".into(), Value::Object(children));

    Value::Object(node)
}

/// Full edge object.
pub fn edge_value(edge: &Edge) -> Value {
    let mut value = json!({
        "type": edge.kind().as_str(),
        "source": edge.source,
        "line": edge.line,
    });
    let Some(object) = value.as_object_mut() else {
        return value;
    };

    match &edge.detail {
        EdgeDetail::Import {
            target,
            form,
            items,
        } => {
            object.insert("target".into(), json!(target));
            object.insert("items".into(), json!(items));
            object.insert("integration_type".into(), json!(form.as_str()));
        }
        EdgeDetail::Call { target, args } => {
            object.insert("target".into(), json!(target.name()));
            object.insert("resolution".into(), json!(target.resolution()));
            let args: Vec<Value> = args.iter().map(argument_value).collect();
            object.insert("args".into(), Value::Array(args));
            object.insert("integration_type".into(), json!("function_call"));
        }
        EdgeDetail::Attribute { target, access } => {
            object.insert("target".into(), json!(target));
            object.insert("access".into(), json!(access.as_str()));
            object.insert("integration_type".into(), json!("attribute_access"));
        }
        EdgeDetail::Inheritance { bases } => {
            object.insert("targets".into(), json!(bases));
            object.insert("integration_type".into(), json!("inheritance"));
        }
    }

    value
}

fn argument_value(arg: &CallArgument) -> Value {
    let mut value = Map::new();
    value.insert("type".into(), json!(arg.kind.as_str()));
    if arg.kind == ArgumentKind::Keyword {
        value.insert("name".into(), json!(arg.name));
    }
    value.insert("value".into(), json!(arg.value));
    Value::Object(value)
}

fn statistics(map: &IntegrationMap) -> Value {
    let mut by_type = Map::new();
    for kind in [
        EdgeKind::Import,
        EdgeKind::Call,
        EdgeKind::Attribute,
        EdgeKind::Inheritance,
    ] {
        let count = map.edges.iter().filter(|e| e.kind() == kind).count();
        by_type.insert(kind.as_str().into(), json!(count));
    }

    json!({
        "total_components": map.symbols.len(),
        "total_integration_points": map.edges.len(),
        "total_edges": map.edges.len(),
        "edges_by_type": by_type,
    })
}
