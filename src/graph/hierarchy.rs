//
//  hierarchy.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

//! Pass 1: walk one file and register every module, class and function
//! under its fully qualified name.

use tracing::debug;
use tree_sitter::Node;

use super::scope::{ScopeKind, ScopeStack};
use super::table::SymbolTable;
use super::types::*;
use crate::parser::helpers::{
    assignment_targets, class_bases, docstring, dotted_name, end_line_of, line_of,
    named_children, node_text,
};
use crate::parser::ParsedFile;

/// Symbols registered for one file, module entry first.
#[derive(Debug, Default)]
pub struct HierarchyFragment {
    pub table: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct HierarchyBuilder<'a> {
    file: &'a ParsedFile,
    source: &'a [u8],
    scopes: ScopeStack,
    table: SymbolTable,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> HierarchyBuilder<'a> {
    /// Build the local symbol-table fragment for a parsed file.
    pub fn build(file: &'a ParsedFile) -> HierarchyFragment {
        let mut builder = Self {
            file,
            source: file.source_bytes(),
            scopes: ScopeStack::new(&file.module_fqn),
            table: SymbolTable::new(),
            diagnostics: Vec::new(),
        };

        let root = file.root_node();
        let module = SymbolEntry::module(
            &file.module_fqn,
            &file.relative,
            docstring(&root, builder.source),
        );
        let _ = builder.table.insert(module);
        builder.visit_children(&root);

        debug!(
            file = %file.relative,
            symbols = builder.table.len(),
            duplicates = builder.diagnostics.len(),
            "hierarchy built"
        );

        HierarchyFragment {
            table: builder.table,
            diagnostics: builder.diagnostics,
        }
    }

    // ─── Traversal ──────────────────────────────────────────────────

    fn visit(&mut self, node: &Node) {
        match node.kind() {
            "class_definition" => self.visit_class(node),
            "function_definition" => self.visit_function(node),
            "assignment" => {
                self.record_assignment(node, true);
                self.visit_children(node);
            }
            "augmented_assignment" | "for_statement" => {
                self.record_assignment(node, false);
                self.visit_children(node);
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: &Node) {
        for child in named_children(node) {
            self.visit(&child);
        }
    }

    fn visit_class(&mut self, node: &Node) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = node_text(&name_node, self.source);
        let fqn = self.scopes.child_fqn(&name);

        let body = node.child_by_field_name("body");
        let bases = class_bases(node, self.source)
            .iter()
            .filter_map(|b| dotted_name(b, self.source))
            .collect();
        let entry = SymbolEntry::class(
            &fqn,
            &self.file.relative,
            LineRange::new(line_of(node), end_line_of(node)),
            body.and_then(|b| docstring(&b, self.source)),
            bases,
        );
        self.register(entry, &name, line_of(node), false);

        self.scopes.push_class(&name);
        if let Some(body) = body {
            self.visit_children(&body);
        }
        self.scopes.pop();
    }

    fn visit_function(&mut self, node: &Node) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = node_text(&name_node, self.source);
        let fqn = self.scopes.child_fqn(&name);

        let scope = match self.scopes.current_kind() {
            ScopeKind::Class => FunctionScope::Method,
            ScopeKind::Module => FunctionScope::ModuleLevel,
            ScopeKind::Function => FunctionScope::Nested,
        };
        let parameters = node
            .child_by_field_name("parameters")
            .map(|p| parameter_names(&p, self.source))
            .unwrap_or_default();
        let info = FunctionInfo {
            parameters,
            scope,
            is_async: node.child(0).is_some_and(|c| c.kind() == "async"),
        };
        let is_method = info.is_method();
        let receiver = if is_method && !is_staticmethod(node, self.source) {
            info.parameters.first().filter(|p| !p.starts_with('*')).cloned()
        } else {
            None
        };

        let body = node.child_by_field_name("body");
        let entry = SymbolEntry::function(
            &fqn,
            &self.file.relative,
            LineRange::new(line_of(node), end_line_of(node)),
            body.and_then(|b| docstring(&b, self.source)),
            info,
        );
        self.register(entry, &name, line_of(node), is_method);

        self.scopes.push_function(&name, receiver);
        if let Some(body) = body {
            self.visit_children(&body);
        }
        self.scopes.pop();
    }

    // ─── Registration ───────────────────────────────────────────────

    /// Insert an entry and link it to the current scope. A duplicate FQN
    /// keeps the first definition and leaves a diagnostic.
    fn register(&mut self, entry: SymbolEntry, name: &str, line: usize, is_method: bool) {
        let fqn = entry.fqn.clone();
        if !self.table.insert(entry) {
            debug!(file = %self.file.relative, fqn = %fqn, line, "duplicate definition");
            self.diagnostics.push(Diagnostic::structural(
                &self.file.relative,
                Phase::Hierarchy,
                format!("duplicate definition of `{fqn}` at line {line}; first definition kept"),
            ));
            return;
        }

        let parent_fqn = self.scopes.current_fqn().to_string();
        if let Some(parent) = self.table.get_mut(&parent_fqn) {
            parent.add_child(name, &fqn);
            if is_method {
                if let Some(class) = parent.class_info_mut() {
                    if !class.methods.iter().any(|m| m.name == name) {
                        class.methods.push(ChildRef::new(name, &fqn));
                    }
                }
            }
        }
    }

    /// Class attributes: plain names assigned in a class body, and
    /// `<receiver>.<attr>` targets written inside a method.
    fn record_assignment(&mut self, node: &Node, plain_names: bool) {
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };

        let (class_fqn, receiver) = match self.scopes.current_kind() {
            ScopeKind::Class if plain_names => (self.scopes.current_fqn().to_string(), None),
            ScopeKind::Function => match self.scopes.enclosing_method() {
                Some((class, receiver)) => (class.to_string(), Some(receiver.to_string())),
                None => return,
            },
            _ => return,
        };

        let mut found = Vec::new();
        for target in assignment_targets(&left) {
            match (&receiver, target.kind()) {
                (None, "identifier") => {
                    found.push((node_text(&target, self.source), line_of(&target)));
                }
                (Some(receiver), "attribute") => {
                    let object = target.child_by_field_name("object");
                    let attr = target.child_by_field_name("attribute");
                    if let (Some(object), Some(attr)) = (object, attr) {
                        if object.kind() == "identifier"
                            && node_text(&object, self.source) == *receiver
                        {
                            found.push((node_text(&attr, self.source), line_of(&target)));
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(class) = self
            .table
            .get_mut(&class_fqn)
            .and_then(|e| e.class_info_mut())
        {
            for (name, line) in found {
                class.add_attribute(&name, line);
            }
        }
    }
}

/// Parameter names in declaration order. Splats keep their `*` / `**`
/// prefix; the bare `*` and `/` separators are dropped.
fn parameter_names(parameters: &Node, source: &[u8]) -> Vec<String> {
    named_children(parameters)
        .iter()
        .filter_map(|p| parameter_name(p, source))
        .collect()
}

fn parameter_name(node: &Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
            Some(node_text(node, source))
        }
        "default_parameter" | "typed_default_parameter" => node
            .child_by_field_name("name")
            .map(|n| node_text(&n, source)),
        "typed_parameter" => named_children(node)
            .first()
            .and_then(|inner| parameter_name(inner, source)),
        _ => None,
    }
}

/// Whether a definition is decorated with `@staticmethod`.
fn is_staticmethod(function: &Node, source: &[u8]) -> bool {
    let Some(parent) = function.parent() else {
        return false;
    };
    if parent.kind() != "decorated_definition" {
        return false;
    }
    named_children(&parent)
        .iter()
        .filter(|c| c.kind() == "decorator")
        .any(|d| node_text(d, source).trim_start_matches('@').trim() == "staticmethod")
}
