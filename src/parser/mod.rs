//
//  mod.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

pub mod helpers;
pub mod language;

use std::fs;
use std::path::{Component, Path, PathBuf};

use tree_sitter::{Node, Parser, Tree};

use crate::error::{MapperError, Result};
pub use language::{is_python_source, python_language};

/// A source file parsed once and shared by both traversal passes.
pub struct ParsedFile {
    /// Path relative to the analyzed root, `/`-separated.
    pub relative: String,
    pub module_fqn: String,
    pub source: String,
    pub tree: Tree,
}

impl ParsedFile {
    pub fn source_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }
}

/// `/`-joined relative path of `path` under `root`.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Module FQN for a relative path: separators become `.`, `.py` is stripped.
///
/// `pkg/sub/mod.py` → `pkg.sub.mod`, `pkg/__init__.py` → `pkg.__init__`.
pub fn module_fqn(relative: &str) -> String {
    let trimmed = relative.strip_suffix(".py").unwrap_or(relative);
    trimmed
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Parse Python source. Trees containing ERROR or MISSING nodes are
/// rejected: a file with invalid syntax never reaches the graph.
pub fn parse_source(path: &Path, source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&python_language())
        .map_err(|e| MapperError::ParserInit(path.to_path_buf(), e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| MapperError::ParseFailed(path.to_path_buf()))?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        return Err(MapperError::Syntax {
            path: path.to_path_buf(),
            line,
        });
    }

    Ok(tree)
}

/// Read and parse one file under `root`.
pub fn parse_file(root: &Path, path: &Path) -> Result<ParsedFile> {
    let source = fs::read_to_string(path)?;
    let relative = relative_path(root, path);
    let tree = parse_source(&PathBuf::from(&relative), &source)?;

    Ok(ParsedFile {
        module_fqn: module_fqn(&relative),
        relative,
        source,
        tree,
    })
}

/// Line of the first ERROR or MISSING node, depth-first.
fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(line) = first_error_line(child) {
            return Some(line);
        }
    }
    None
}
