//
//  integration.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

//! Pass 2: walk one file against the merged symbol table and record
//! import, call, attribute and inheritance edges.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use tree_sitter::Node;

use super::scope::ScopeStack;
use super::table::SymbolTable;
use super::types::*;
use crate::parser::helpers::{
    assignment_targets, class_bases, field_children, flatten_attribute, line_of, named_children,
    node_text,
};
use crate::parser::ParsedFile;

/// Local names bound by import statements in one file.
#[derive(Debug, Default)]
pub struct AliasMap {
    bindings: HashMap<String, String>,
}

impl AliasMap {
    pub fn bind(&mut self, local: &str, target: &str) {
        self.bindings.insert(local.to_string(), target.to_string());
    }

    pub fn resolve(&self, local: &str) -> Option<&str> {
        self.bindings.get(local).map(String::as_str)
    }
}

/// Edges and call-graph entries produced for one file.
#[derive(Debug, Default)]
pub struct IntegrationFragment {
    pub edges: Vec<Edge>,
    pub call_graph: CallGraph,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct IntegrationExtractor<'a> {
    file: &'a ParsedFile,
    source: &'a [u8],
    table: &'a SymbolTable,
    scopes: ScopeStack,
    aliases: AliasMap,
    edges: Vec<Edge>,
    call_graph: CallGraph,
    diagnostics: Vec<Diagnostic>,
    missing_sources: HashSet<String>,
}

impl<'a> IntegrationExtractor<'a> {
    /// Extract every integration edge of a parsed file. The table is the
    /// complete global table and is only read.
    pub fn extract(file: &'a ParsedFile, table: &'a SymbolTable) -> IntegrationFragment {
        let mut extractor = Self {
            file,
            source: file.source_bytes(),
            table,
            scopes: ScopeStack::new(&file.module_fqn),
            aliases: AliasMap::default(),
            edges: Vec::new(),
            call_graph: CallGraph::new(),
            diagnostics: Vec::new(),
            missing_sources: HashSet::new(),
        };

        extractor.visit_children(&file.root_node());

        debug!(
            file = %file.relative,
            edges = extractor.edges.len(),
            callees = extractor.call_graph.len(),
            "integration edges extracted"
        );

        IntegrationFragment {
            edges: extractor.edges,
            call_graph: extractor.call_graph,
            diagnostics: extractor.diagnostics,
        }
    }

    // ─── Traversal ──────────────────────────────────────────────────

    fn visit(&mut self, node: &Node) {
        match node.kind() {
            "import_statement" => self.visit_import(node),
            "import_from_statement" | "future_import_statement" => self.visit_import_from(node),
            "class_definition" => self.visit_class(node),
            "function_definition" => self.visit_function(node),
            "call" => self.visit_call(node),
            "attribute" => self.visit_attribute(node, AttributeAccess::Read),
            "assignment" | "augmented_assignment" | "for_statement" => {
                self.visit_assignment(node)
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: &Node) {
        for child in named_children(node) {
            self.visit(&child);
        }
    }

    /// Visit the `left` targets as writes and everything else as usual.
    fn visit_assignment(&mut self, node: &Node) {
        let left = node.child_by_field_name("left");
        for child in named_children(node) {
            if left.is_some_and(|l| l.id() == child.id()) {
                for target in assignment_targets(&child) {
                    if target.kind() == "attribute" {
                        self.visit_attribute(&target, AttributeAccess::Write);
                    } else {
                        self.visit(&target);
                    }
                }
            } else {
                self.visit(&child);
            }
        }
    }

    fn visit_class(&mut self, node: &Node) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = node_text(&name_node, self.source);

        // The base list is evaluated in the enclosing scope.
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            self.visit_children(&superclasses);
        }

        let bases: Vec<String> = class_bases(node, self.source)
            .iter()
            .map(|base| match base.kind() {
                "identifier" => {
                    let local = node_text(base, self.source);
                    self.aliases.resolve(&local).map(str::to_string).unwrap_or(local)
                }
                _ => flatten_attribute(base, self.source).dotted,
            })
            .collect();

        self.scopes.push_class(&name);
        if !bases.is_empty() {
            self.push_edge(line_of(node), EdgeDetail::Inheritance { bases });
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(&body);
        }
        self.scopes.pop();
    }

    fn visit_function(&mut self, node: &Node) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = node_text(&name_node, self.source);

        // Defaults and annotations belong to the enclosing scope.
        for field in ["parameters", "return_type"] {
            if let Some(child) = node.child_by_field_name(field) {
                self.visit_children(&child);
            }
        }

        self.scopes.push_function(&name, None);
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(&body);
        }
        self.scopes.pop();
    }

    // ─── Imports ────────────────────────────────────────────────────

    /// `import x`, `import x as y`, `import a, b`: one edge per module.
    fn visit_import(&mut self, node: &Node) {
        for item in field_children(node, "name") {
            let (module, bound) = match item.kind() {
                "aliased_import" => {
                    let module = item
                        .child_by_field_name("name")
                        .map(|n| node_text(&n, self.source))
                        .unwrap_or_default();
                    let alias = item
                        .child_by_field_name("alias")
                        .map(|n| node_text(&n, self.source))
                        .unwrap_or_else(|| module.clone());
                    (module, alias)
                }
                _ => {
                    let module = node_text(&item, self.source);
                    (module.clone(), module)
                }
            };
            if module.is_empty() {
                continue;
            }

            self.aliases.bind(&bound, &module);
            self.push_edge(
                line_of(node),
                EdgeDetail::Import {
                    target: module,
                    form: ImportForm::ImportModule,
                    items: vec![bound],
                },
            );
        }
    }

    /// `from m import a, b as c`: one edge per statement.
    fn visit_import_from(&mut self, node: &Node) {
        let module = match node.child_by_field_name("module_name") {
            Some(name) if name.kind() == "relative_import" => {
                self.resolve_relative(&node_text(&name, self.source))
            }
            Some(name) => node_text(&name, self.source),
            None if node.kind() == "future_import_statement" => "__future__".to_string(),
            None => return,
        };

        let mut items = Vec::new();
        for item in field_children(node, "name") {
            let (name, bound) = match item.kind() {
                "aliased_import" => {
                    let name = item
                        .child_by_field_name("name")
                        .map(|n| node_text(&n, self.source))
                        .unwrap_or_default();
                    let alias = item
                        .child_by_field_name("alias")
                        .map(|n| node_text(&n, self.source))
                        .unwrap_or_else(|| name.clone());
                    (name, alias)
                }
                _ => {
                    let name = node_text(&item, self.source);
                    (name.clone(), name)
                }
            };
            self.aliases.bind(&bound, &format!("{module}.{name}"));
            items.push(name);
        }

        let mut cursor = node.walk();
        if node
            .children(&mut cursor)
            .any(|c| c.kind() == "wildcard_import")
        {
            items.push("*".to_string());
        }

        self.push_edge(
            line_of(node),
            EdgeDetail::Import {
                target: module,
                form: ImportForm::ImportFrom,
                items,
            },
        );
    }

    /// Resolve `.x` / `..x` against the current module's package. A level
    /// deeper than the package nesting keeps the raw text.
    fn resolve_relative(&self, raw: &str) -> String {
        let level = raw.chars().take_while(|&c| c == '.').count();
        let rest = &raw[level..];

        let mut package: Vec<&str> = self.file.module_fqn.split('.').collect();
        package.pop();
        if level == 0 || level > package.len() {
            return raw.to_string();
        }
        package.truncate(package.len() + 1 - level);

        let base = package.join(".");
        if rest.is_empty() {
            base
        } else {
            format!("{base}.{rest}")
        }
    }

    // ─── Calls and attributes ───────────────────────────────────────

    fn visit_call(&mut self, node: &Node) {
        let target = match node.child_by_field_name("function") {
            Some(function) => self.resolve_callee(&function),
            None => CallTarget::Unresolved,
        };

        let mut args = Vec::new();
        if let Some(arguments) = node.child_by_field_name("arguments") {
            if arguments.kind() == "argument_list" {
                for arg in named_children(&arguments) {
                    args.push(self.call_argument(&arg));
                }
            } else {
                args.push(CallArgument::positional(node_text(&arguments, self.source)));
            }
        }

        let callee = target.callee_id().to_string();
        let caller = self.scopes.current_fqn().to_string();
        if self.push_edge(line_of(node), EdgeDetail::Call { target, args }) {
            self.call_graph.record(&callee, &caller);
        }

        if let Some(arguments) = node.child_by_field_name("arguments") {
            self.visit_children(&arguments);
        }
    }

    /// Static callee of a call. Computed parts of the callee expression
    /// are visited for their own edges.
    fn resolve_callee(&mut self, function: &Node) -> CallTarget {
        let name = match function.kind() {
            "identifier" => self.resolve_name(&node_text(function, self.source)),
            "attribute" => {
                let chain = flatten_attribute(function, self.source);
                if !chain.rooted {
                    self.visit(&chain.base);
                    return CallTarget::Unresolved;
                }
                chain.dotted
            }
            _ => {
                self.visit(function);
                return CallTarget::Unresolved;
            }
        };

        if self.table.contains(&name) {
            CallTarget::Resolved(name)
        } else {
            CallTarget::External(name)
        }
    }

    /// Bare name: its import alias target, or the name itself.
    fn resolve_name(&self, local: &str) -> String {
        self.aliases
            .resolve(local)
            .map_or_else(|| local.to_string(), str::to_string)
    }

    fn call_argument(&self, arg: &Node) -> CallArgument {
        match arg.kind() {
            "keyword_argument" => CallArgument::keyword(
                arg.child_by_field_name("name")
                    .map(|n| node_text(&n, self.source)),
                arg.child_by_field_name("value")
                    .map(|v| node_text(&v, self.source))
                    .unwrap_or_default(),
            ),
            "dictionary_splat" => CallArgument::keyword(
                None,
                named_children(arg)
                    .first()
                    .map(|v| node_text(v, self.source))
                    .unwrap_or_default(),
            ),
            _ => CallArgument::positional(node_text(arg, self.source)),
        }
    }

    /// Record one maximal attribute chain.
    fn visit_attribute(&mut self, node: &Node, access: AttributeAccess) {
        let chain = flatten_attribute(node, self.source);
        if !chain.dotted.is_empty() {
            self.push_edge(
                line_of(node),
                EdgeDetail::Attribute {
                    target: chain.dotted,
                    access,
                },
            );
        }
        if !chain.rooted {
            self.visit(&chain.base);
        }
    }

    // ─── Recording ──────────────────────────────────────────────────

    /// Append an edge from the current scope. Returns false when the scope
    /// has no table entry; the edge is then dropped with a diagnostic.
    fn push_edge(&mut self, line: usize, detail: EdgeDetail) -> bool {
        let source = self.scopes.current_fqn();
        if !self.table.contains(source) {
            if self.missing_sources.insert(source.to_string()) {
                debug!(file = %self.file.relative, source, "edge source not in symbol table");
                self.diagnostics.push(Diagnostic::structural(
                    &self.file.relative,
                    Phase::Integration,
                    format!("edges from `{source}` skipped: not in symbol table"),
                ));
            }
            return false;
        }

        self.edges.push(Edge {
            source: source.to_string(),
            line,
            detail,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::hierarchy::HierarchyBuilder;
    use crate::parser::parse_source;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn parsed(relative: &str, source: &str) -> ParsedFile {
        ParsedFile {
            relative: relative.to_string(),
            module_fqn: crate::parser::module_fqn(relative),
            source: source.to_string(),
            tree: parse_source(Path::new(relative), source).unwrap(),
        }
    }

    fn table_for(files: &[&ParsedFile]) -> SymbolTable {
        let mut table = SymbolTable::new();
        for file in files {
            let fragment = HierarchyBuilder::build(file);
            assert!(table.merge_fragment(fragment.table, &file.relative).accepted);
        }
        table
    }

    fn extract_one(relative: &str, source: &str) -> IntegrationFragment {
        let file = parsed(relative, source);
        let table = table_for(&[&file]);
        IntegrationExtractor::extract(&file, &table)
    }

    fn of_kind(fragment: &IntegrationFragment, kind: EdgeKind) -> Vec<&Edge> {
        fragment.edges.iter().filter(|e| e.kind() == kind).collect()
    }

    #[test]
    fn test_import_edges() {
        let fragment = extract_one(
            "pkg/mod.py",
            indoc! {r#"
                import os, pkg.sub as ps
                from collections import OrderedDict, defaultdict as dd
                from .models import User
                from . import helpers
                from .. import too_far
                from typing import *
                from __future__ import annotations
            "#},
        );
        let imports = of_kind(&fragment, EdgeKind::Import);
        let summary: Vec<(&str, &str, Vec<&str>)> = imports
            .iter()
            .map(|e| match &e.detail {
                EdgeDetail::Import { target, form, items } => (
                    target.as_str(),
                    form.as_str(),
                    items.iter().map(String::as_str).collect(),
                ),
                _ => unreachable!(),
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("os", "import_module", vec!["os"]),
                ("pkg.sub", "import_module", vec!["ps"]),
                ("collections", "import_from", vec!["OrderedDict", "defaultdict"]),
                ("pkg.models", "import_from", vec!["User"]),
                ("pkg", "import_from", vec!["helpers"]),
                ("..", "import_from", vec!["too_far"]),
                ("typing", "import_from", vec!["*"]),
                ("__future__", "import_from", vec!["annotations"]),
            ]
        );
        assert!(imports.iter().all(|e| e.source == "pkg.mod"));
        assert_eq!(imports[0].line, 1);
        assert_eq!(imports[2].line, 2);
    }

    #[test]
    fn test_call_resolution() {
        let fragment = extract_one(
            "app.py",
            indoc! {r#"
                from util import parse as p
                import json

                def helper():
                    pass

                class Worker:
                    def run(self, items):
                        helper()
                        p(items, strict=True, **opts)
                        json.dumps(*items)
                        self.step()
                        handlers[0]()
                        print(len(items))
            "#},
        );
        let calls: Vec<(&CallTarget, &str)> = of_kind(&fragment, EdgeKind::Call)
            .iter()
            .map(|e| match &e.detail {
                EdgeDetail::Call { target, .. } => (target, e.source.as_str()),
                _ => unreachable!(),
            })
            .collect();

        assert_eq!(
            calls,
            vec![
                (&CallTarget::External("helper".into()), "app.Worker.run"),
                (&CallTarget::External("util.parse".into()), "app.Worker.run"),
                (&CallTarget::External("json.dumps".into()), "app.Worker.run"),
                (&CallTarget::External("self.step".into()), "app.Worker.run"),
                (&CallTarget::Unresolved, "app.Worker.run"),
                (&CallTarget::External("print".into()), "app.Worker.run"),
                (&CallTarget::External("len".into()), "app.Worker.run"),
            ]
        );

        assert_eq!(fragment.call_graph.fan_in(DYNAMIC_CALLEE), 1);
        assert_eq!(fragment.call_graph.callers("helper"), &["app.Worker.run".to_string()]);

        let parse_args = match &of_kind(&fragment, EdgeKind::Call)[1].detail {
            EdgeDetail::Call { args, .. } => args.clone(),
            _ => unreachable!(),
        };
        assert_eq!(
            parse_args,
            vec![
                CallArgument::positional("items"),
                CallArgument::keyword(Some("strict".into()), "True"),
                CallArgument::keyword(None, "opts"),
            ]
        );

        // Callee chains are covered by the call edge.
        assert!(of_kind(&fragment, EdgeKind::Attribute).is_empty());
    }

    #[test]
    fn test_bare_call_keeps_local_name() {
        let fragment = extract_one("a.py", "def f(): pass\ndef g(): f()\n");
        let calls = of_kind(&fragment, EdgeKind::Call);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].source, "a.g");
        assert_eq!(
            calls[0].detail,
            EdgeDetail::Call {
                target: CallTarget::External("f".into()),
                args: vec![],
            }
        );
        let callees: Vec<&str> = fragment.call_graph.iter().map(|(callee, _)| callee).collect();
        assert_eq!(callees, vec!["f"]);
    }

    #[test]
    fn test_attribute_access() {
        let fragment = extract_one(
            "m.py",
            indoc! {r#"
                class Counter:
                    def bump(self, other):
                        self.count += 1
                        self.last, other.peer = 1, 2
                        total = other.config.limit
                        for self.cursor in range(3):
                            pass
                        make().value
            "#},
        );
        let attrs: Vec<(&str, AttributeAccess)> = of_kind(&fragment, EdgeKind::Attribute)
            .iter()
            .map(|e| match &e.detail {
                EdgeDetail::Attribute { target, access } => (target.as_str(), *access),
                _ => unreachable!(),
            })
            .collect();

        assert_eq!(
            attrs,
            vec![
                ("self.count", AttributeAccess::Write),
                ("self.last", AttributeAccess::Write),
                ("other.peer", AttributeAccess::Write),
                ("other.config.limit", AttributeAccess::Read),
                ("self.cursor", AttributeAccess::Write),
                ("value", AttributeAccess::Read),
            ]
        );
        // `make()` inside the unrooted chain is still a call.
        assert_eq!(of_kind(&fragment, EdgeKind::Call).len(), 2);
    }

    #[test]
    fn test_inheritance_edges() {
        let fragment = extract_one(
            "m.py",
            indoc! {r#"
                from base import Base

                class Plain:
                    pass

                class Model(Base, ext.Mixin, metaclass=Meta):
                    pass
            "#},
        );
        let inherits = of_kind(&fragment, EdgeKind::Inheritance);
        assert_eq!(inherits.len(), 1);
        assert_eq!(inherits[0].source, "m.Model");
        assert_eq!(
            inherits[0].detail,
            EdgeDetail::Inheritance {
                bases: vec!["base.Base".into(), "ext.Mixin".into()]
            }
        );
        // `ext.Mixin` in the header is also a read in the module scope.
        let reads = of_kind(&fragment, EdgeKind::Attribute);
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].source, "m");
    }

    #[test]
    fn test_cross_file_resolution() {
        let a = parsed("a.py", "def f():\n    pass\n");
        let b = parsed("b.py", "import a\n\ndef g():\n    a.f()\n");
        let table = table_for(&[&a, &b]);
        let fragment = IntegrationExtractor::extract(&b, &table);

        assert_eq!(fragment.edges.len(), 2);
        assert_eq!(fragment.edges[0].source, "b");
        assert_eq!(fragment.edges[0].target(), Some("a"));
        assert_eq!(fragment.edges[1].source, "b.g");
        assert_eq!(
            fragment.edges[1].detail,
            EdgeDetail::Call {
                target: CallTarget::Resolved("a.f".into()),
                args: vec![]
            }
        );
    }

    #[test]
    fn test_missing_source_is_skipped_once() {
        let file = parsed("m.py", "def f():\n    g()\n    h()\n");
        let mut table = SymbolTable::new();
        let _ = table.insert(SymbolEntry::module("m", "m.py", None));
        let fragment = IntegrationExtractor::extract(&file, &table);

        assert!(fragment.edges.is_empty());
        assert!(fragment.call_graph.is_empty());
        assert_eq!(fragment.diagnostics.len(), 1);
        assert_eq!(fragment.diagnostics[0].phase, Phase::Integration);
    }
}
