//
//  decoder.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

//! Reconstructs an [`IntegrationMap`] from the compact layout.
//!
//! Structural problems (missing `idx`/`cmp`, unknown kind codes, IDs that
//! point nowhere inside `cmp`) fail the whole decode. A malformed edge,
//! crossroad, path or diagnostic row is skipped with a warning.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::warn;

use super::codes::{self, EdgeCode};
use super::verbose;
use crate::error::{MapperError, Result};
use crate::graph::table::SymbolTable;
use crate::graph::types::*;
use crate::IntegrationMap;

/// Decode a compact document back into a map.
pub fn decode_compact(value: &Value) -> Result<IntegrationMap> {
    let root = value
        .as_object()
        .ok_or_else(|| decode_error("document is not a JSON object"))?;

    if let Some(version) = root.get(codes::VERSION).and_then(Value::as_u64) {
        if version != codes::FORMAT_VERSION {
            warn!(version, "unexpected compact format version");
        }
    }

    let index = read_index(root)?;
    let symbols = read_components(root, &index)?;

    let mut edges = Vec::new();
    for row in section(root, codes::EDGES) {
        match read_edge(row, &index) {
            Some(edge) => edges.push(edge),
            None => warn!(row = %row, "skipping malformed edge"),
        }
    }

    let crossroads = section(root, codes::CROSSROADS)
        .iter()
        .filter_map(|row| {
            let crossroad = read_crossroad(row, &index);
            if crossroad.is_none() {
                warn!(row = %row, "skipping malformed crossroad");
            }
            crossroad
        })
        .collect();
    let critical_paths = section(root, codes::CRITICAL_PATHS)
        .iter()
        .filter_map(|row| {
            let path = read_critical_path(row, &index);
            if path.is_none() {
                warn!(row = %row, "skipping malformed critical path");
            }
            path
        })
        .collect();
    let diagnostics = section(root, codes::DIAGNOSTICS)
        .iter()
        .filter_map(|row| {
            let diagnostic = read_diagnostic(row);
            if diagnostic.is_none() {
                warn!(row = %row, "skipping malformed diagnostic");
            }
            diagnostic
        })
        .collect();

    Ok(IntegrationMap {
        symbols,
        edges,
        crossroads,
        critical_paths,
        summary: read_summary(root.get(codes::METADATA)),
        diagnostics,
    })
}

/// Decode a compact document and re-render it in the verbose layout.
pub fn decode_to_verbose(value: &Value) -> Result<Value> {
    Ok(verbose::render(&decode_compact(value)?))
}

fn decode_error(message: impl Into<String>) -> MapperError {
    MapperError::Decode(message.into())
}

fn section<'a>(root: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    root.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn read_index(root: &Map<String, Value>) -> Result<HashMap<u64, String>> {
    let raw = root
        .get(codes::INDEX)
        .and_then(Value::as_object)
        .ok_or_else(|| decode_error("missing `idx` section"))?;

    let mut index = HashMap::with_capacity(raw.len());
    for (key, fqn) in raw {
        let id: u64 = key
            .parse()
            .map_err(|_| decode_error(format!("index key `{key}` is not an integer")))?;
        let fqn = fqn
            .as_str()
            .ok_or_else(|| decode_error(format!("index entry {id} is not a string")))?;
        index.insert(id, fqn.to_string());
    }
    Ok(index)
}

fn lookup<'a>(index: &'a HashMap<u64, String>, value: &Value) -> Option<&'a str> {
    value
        .as_u64()
        .and_then(|id| index.get(&id))
        .map(String::as_str)
}

/// An ID resolved through the index, or a literal name.
fn reference(index: &HashMap<u64, String>, value: &Value) -> Option<String> {
    match value {
        Value::String(name) => Some(name.clone()),
        _ => lookup(index, value).map(str::to_string),
    }
}

fn strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn id_refs(
    index: &HashMap<u64, String>,
    value: Option<&Value>,
    owner: &str,
) -> Result<Vec<ChildRef>> {
    let Some(ids) = value.and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    ids.iter()
        .map(|id| {
            let fqn = lookup(index, id)
                .ok_or_else(|| decode_error(format!("`{owner}` references unknown id {id}")))?;
            let (_, name) = split_fqn(fqn);
            Ok(ChildRef::new(name, fqn))
        })
        .collect()
}

fn read_components(root: &Map<String, Value>, index: &HashMap<u64, String>) -> Result<SymbolTable> {
    let components = root
        .get(codes::COMPONENTS)
        .and_then(Value::as_array)
        .ok_or_else(|| decode_error("missing `cmp` section"))?;

    let mut table = SymbolTable::new();
    for component in components {
        let entry = read_component(component, index)?;
        let fqn = entry.fqn.clone();
        if !table.insert(entry) {
            return Err(decode_error(format!("component `{fqn}` appears twice")));
        }
    }
    Ok(table)
}

fn read_component(component: &Value, index: &HashMap<u64, String>) -> Result<SymbolEntry> {
    let id = component.get(codes::CMP_ID).cloned().unwrap_or_default();
    let fqn = lookup(index, &id)
        .ok_or_else(|| decode_error(format!("component id {id} is not in the index")))?;
    let code = component
        .get(codes::CMP_TYPE)
        .and_then(Value::as_str)
        .unwrap_or_default();
    let (kind, scope) = codes::parse_kind_code(code)
        .ok_or_else(|| decode_error(format!("unknown component type `{code}` for `{fqn}`")))?;

    let detail = match kind {
        SymbolKind::Package => SymbolDetail::Package,
        SymbolKind::Module => SymbolDetail::Module,
        SymbolKind::Class => {
            let attributes = component
                .get(codes::CMP_ATTRIBUTES)
                .and_then(Value::as_array)
                .map(|rows| {
                    rows.iter()
                        .filter_map(|row| {
                            Some(ClassAttribute {
                                name: row.get(0)?.as_str()?.to_string(),
                                line: row.get(1)?.as_u64()? as usize,
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            SymbolDetail::Class(ClassInfo {
                bases: strings(component.get(codes::CMP_BASES)),
                methods: id_refs(index, component.get(codes::CMP_METHODS), fqn)?,
                attributes,
            })
        }
        SymbolKind::Function => SymbolDetail::Function(FunctionInfo {
            parameters: strings(component.get(codes::CMP_PARAMETERS)),
            scope: scope.unwrap_or(FunctionScope::ModuleLevel),
            is_async: component
                .get(codes::CMP_ASYNC)
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }),
    };

    let line_range = component
        .get(codes::CMP_LINES)
        .and_then(Value::as_array)
        .and_then(|pair| match pair.as_slice() {
            [start, end] => Some(LineRange::new(
                start.as_u64()? as usize,
                end.as_u64()? as usize,
            )),
            _ => None,
        });
    let text = |key: &str| {
        component
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let (parent, name) = split_fqn(fqn);

    Ok(SymbolEntry {
        fqn: fqn.to_string(),
        name: name.to_string(),
        parent: parent.map(str::to_string),
        line_range,
        path: text(codes::CMP_PATH),
        docstring: text(codes::CMP_DOC),
        children: id_refs(index, component.get(codes::CMP_CHILDREN), fqn)?,
        detail,
    })
}

fn read_edge(row: &Value, index: &HashMap<u64, String>) -> Option<Edge> {
    let fields = row.as_array()?;
    if fields.len() < 4 {
        return None;
    }
    let source = lookup(index, &fields[0])?.to_string();
    let target_id = fields[1].as_i64()?;
    let code = EdgeCode::parse(fields[2].as_str()?)?;
    let line = fields[3].as_u64()? as usize;

    let mut text = None;
    let mut payload = None;
    for extra in &fields[4..] {
        match extra {
            Value::String(s) if text.is_none() => text = Some(s.clone()),
            Value::Object(map) => payload = Some(map),
            _ => {}
        }
    }

    let indexed = if target_id == codes::NO_TARGET {
        None
    } else {
        Some(index.get(&u64::try_from(target_id).ok()?)?.clone())
    };
    let named_target = || indexed.clone().or_else(|| text.clone());
    let payload_strings = |key: &str| strings(payload.and_then(|p| p.get(key)));

    let detail = match code {
        EdgeCode::ImportModule | EdgeCode::ImportFrom => EdgeDetail::Import {
            target: named_target()?,
            form: if code == EdgeCode::ImportModule {
                ImportForm::ImportModule
            } else {
                ImportForm::ImportFrom
            },
            items: payload_strings(codes::EDGE_ITEMS),
        },
        EdgeCode::Call => {
            let target = match (&indexed, &text) {
                (Some(fqn), _) => CallTarget::Resolved(fqn.clone()),
                (None, Some(name)) => CallTarget::External(name.clone()),
                (None, None) => CallTarget::Unresolved,
            };
            let args = payload
                .and_then(|p| p.get(codes::EDGE_ARGS))
                .and_then(Value::as_array)
                .map(|args| args.iter().filter_map(read_argument).collect())
                .unwrap_or_default();
            EdgeDetail::Call { target, args }
        }
        EdgeCode::AttributeRead | EdgeCode::AttributeWrite => EdgeDetail::Attribute {
            target: named_target()?,
            access: if code == EdgeCode::AttributeRead {
                AttributeAccess::Read
            } else {
                AttributeAccess::Write
            },
        },
        EdgeCode::Inheritance => EdgeDetail::Inheritance {
            bases: payload_strings(codes::EDGE_BASES),
        },
    };

    Some(Edge {
        source,
        line,
        detail,
    })
}

fn read_argument(value: &Value) -> Option<CallArgument> {
    match value {
        Value::String(text) => Some(CallArgument::positional(text.as_str())),
        Value::Array(pair) => match pair.as_slice() {
            [name, text] => Some(CallArgument::keyword(
                name.as_str().map(str::to_string),
                text.as_str()?,
            )),
            _ => None,
        },
        _ => None,
    }
}

fn read_crossroad(row: &Value, index: &HashMap<u64, String>) -> Option<Crossroad> {
    let fields = row.as_array()?;
    let [a, b, count, severity] = fields.as_slice() else {
        return None;
    };
    let a = reference(index, a)?;
    let b = reference(index, b)?;
    Some(Crossroad {
        id: format!("{a}_{b}_junction"),
        components: [a, b],
        integration_count: count.as_u64()? as usize,
        criticality: codes::parse_severity_code(severity.as_str()?)?,
    })
}

fn read_critical_path(row: &Value, index: &HashMap<u64, String>) -> Option<CriticalPath> {
    let fields = row.as_array()?;
    let [callee, fan_in, severity] = fields.as_slice() else {
        return None;
    };
    let callee = reference(index, callee)?;
    Some(CriticalPath {
        id: format!("path_{}", callee.replace('.', "_")),
        callee,
        fan_in: fan_in.as_u64()? as usize,
        complexity: codes::parse_severity_code(severity.as_str()?)?,
    })
}

fn read_diagnostic(row: &Value) -> Option<Diagnostic> {
    let fields = row.as_array()?;
    let [path, phase, kind, message] = fields.as_slice() else {
        return None;
    };
    Some(Diagnostic {
        path: path.as_str()?.to_string(),
        phase: codes::parse_phase_code(phase.as_str()?)?,
        kind: codes::parse_diagnostic_code(kind.as_str()?)?,
        message: message.as_str()?.to_string(),
    })
}

fn read_summary(value: Option<&Value>) -> Summary {
    let count = |key: &str| {
        value
            .and_then(|md| md.get(key))
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize
    };
    Summary {
        files_discovered: count(codes::MD_FILES_DISCOVERED),
        files_analyzed: count(codes::MD_FILES_ANALYZED),
        files_failed: count(codes::MD_FILES_FAILED),
        components_found: count(codes::MD_COMPONENTS_FOUND),
        total_integration_points: count(codes::MD_INTEGRATION_POINTS),
        total_crossroads: count(codes::MD_CROSSROADS),
        total_critical_paths: count(codes::MD_CRITICAL_PATHS),
        analysis_timestamp: value
            .and_then(|md| md.get(codes::MD_TIMESTAMP))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::compact::encode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_map() -> IntegrationMap {
        let mut symbols = SymbolTable::new();
        let mut pkg = SymbolEntry::package("app");
        pkg.add_child("core", "app.core");
        let mut core = SymbolEntry::module("app.core", "app/core.py", Some("Core.".into()));
        core.add_child("Engine", "app.core.Engine");
        let mut engine = SymbolEntry::class(
            "app.core.Engine",
            "app/core.py",
            LineRange::new(3, 9),
            None,
            vec!["Base".into()],
        );
        engine.add_child("start", "app.core.Engine.start");
        if let Some(info) = engine.class_info_mut() {
            info.methods.push(ChildRef::new("start", "app.core.Engine.start"));
            info.add_attribute("state", 5);
        }
        let start = SymbolEntry::function(
            "app.core.Engine.start",
            "app/core.py",
            LineRange::new(4, 9),
            Some("Start it.".into()),
            FunctionInfo {
                parameters: vec!["self".into(), "mode".into()],
                scope: FunctionScope::Method,
                is_async: true,
            },
        );
        for entry in [pkg, core, engine, start] {
            assert!(symbols.insert(entry));
        }

        let edges = vec![
            Edge {
                source: "app.core".into(),
                line: 1,
                detail: EdgeDetail::Import {
                    target: "os".into(),
                    form: ImportForm::ImportModule,
                    items: vec!["os".into()],
                },
            },
            Edge {
                source: "app.core.Engine".into(),
                line: 3,
                detail: EdgeDetail::Inheritance {
                    bases: vec!["Base".into()],
                },
            },
            Edge {
                source: "app.core.Engine.start".into(),
                line: 6,
                detail: EdgeDetail::Call {
                    target: CallTarget::Resolved("app.core.Engine".into()),
                    args: vec![
                        CallArgument::positional("*xs"),
                        CallArgument::keyword(Some("mode".into()), "mode"),
                        CallArgument::keyword(None, "opts"),
                    ],
                },
            },
            Edge {
                source: "app.core.Engine.start".into(),
                line: 7,
                detail: EdgeDetail::Call {
                    target: CallTarget::External("print".into()),
                    args: vec![],
                },
            },
            Edge {
                source: "app.core.Engine.start".into(),
                line: 8,
                detail: EdgeDetail::Call {
                    target: CallTarget::Unresolved,
                    args: vec![],
                },
            },
            Edge {
                source: "app.core.Engine.start".into(),
                line: 5,
                detail: EdgeDetail::Attribute {
                    target: "self.state".into(),
                    access: AttributeAccess::Write,
                },
            },
        ];

        IntegrationMap {
            symbols,
            edges,
            crossroads: vec![Crossroad {
                id: "app_lib_junction".into(),
                components: ["app".into(), "lib".into()],
                integration_count: 4,
                criticality: Severity::Medium,
            }],
            critical_paths: vec![CriticalPath {
                id: "path_<dynamic_call>".into(),
                callee: DYNAMIC_CALLEE.into(),
                fan_in: 6,
                complexity: Severity::High,
            }],
            summary: Summary {
                files_discovered: 2,
                files_analyzed: 1,
                files_failed: 1,
                components_found: 4,
                total_integration_points: 6,
                total_crossroads: 1,
                total_critical_paths: 1,
                analysis_timestamp: "2024-01-01T00:00:00+00:00".into(),
            },
            diagnostics: vec![Diagnostic::parse_failure(
                "broken.py",
                Phase::Hierarchy,
                "syntax error in broken.py at line 1",
            )],
        }
    }

    #[test]
    fn test_decode_inverts_encode() {
        let map = sample_map();
        let decoded = decode_compact(&encode(&map)).unwrap();
        assert_eq!(decoded, map);
    }

    #[test]
    fn test_decode_survives_json_text() {
        let map = sample_map();
        let text = serde_json::to_string(&encode(&map)).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(decode_compact(&value).unwrap(), map);
    }

    #[test]
    fn test_missing_sections_are_errors() {
        let err = decode_compact(&json!({"v": 1, "cmp": []})).unwrap_err();
        assert!(err.to_string().contains("idx"));
        let err = decode_compact(&json!({"v": 1, "idx": {}})).unwrap_err();
        assert!(err.to_string().contains("cmp"));
        assert!(decode_compact(&json!([])).is_err());
    }

    #[test]
    fn test_unknown_component_id_is_an_error() {
        let doc = json!({"idx": {"1": "a"}, "cmp": [{"i": 2, "t": "mo"}]});
        assert!(matches!(decode_compact(&doc), Err(MapperError::Decode(_))));
    }

    #[test]
    fn test_malformed_edges_are_skipped() {
        let doc = json!({
            "idx": {"1": "a"},
            "cmp": [{"i": 1, "t": "mo", "l": [1, 1], "pa": "a.py"}],
            "edg": [
                [1, -1, "c"],
                [9, -1, "c", 2],
                [1, -1, "zz", 3],
                [1, -1, "im", 4],
                [1, -1, "c", 5, null, "print"],
            ],
        });
        let map = decode_compact(&doc).unwrap();
        assert_eq!(map.edges.len(), 1);
        assert_eq!(map.edges[0].line, 5);
        assert_eq!(map.edges[0].target(), Some("print"));
    }

    #[test]
    fn test_decode_to_verbose() {
        let verbose = decode_to_verbose(&encode(&sample_map())).unwrap();
        let engine = &verbose["codebase_tree"]["app"]["children"]["core"]["children"]["Engine"];
        assert_eq!(engine["methods"]["start"], "app.core.Engine.start");
        assert_eq!(verbose["integration_edges"].as_array().unwrap().len(), 6);
        assert_eq!(verbose["metadata"]["files_failed"], 1);
    }
}
