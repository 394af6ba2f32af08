//
//  discovery.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

use crate::error::{MapperError, Result};
use crate::graph::types::{Diagnostic, Phase};
use crate::parser::{is_python_source, relative_path};

/// Directories that should never be indexed, even without .gitignore.
const BUILTIN_IGNORE: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    ".tox",
    ".nox",
    ".venv",
    "venv",
    ".mypy_cache",
    ".pytest_cache",
    ".eggs",
    "site-packages",
    "node_modules",
    "build",
    "dist",
];

/// Per-project ignore file, same syntax as .gitignore.
pub const IGNORE_FILENAME: &str = ".integration-mapignore";

/// Source files selected for one run.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Directory that module FQNs are relative to.
    pub root: PathBuf,
    /// Absolute-or-root-joined paths, sorted by relative path.
    pub files: Vec<PathBuf>,
    /// Unreadable entries and broken ignore files met during the walk.
    pub diagnostics: Vec<Diagnostic>,
}

/// Check if a root-relative path passes through a built-in ignored directory.
fn is_builtin_ignored(root: &Path, path: &Path) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components().any(|c| match c {
        Component::Normal(name) => BUILTIN_IGNORE.contains(&name.to_str().unwrap_or("")),
        _ => false,
    })
}

/// Path an `ignore` error is about, if it names one.
fn walk_error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err)
        }
        ignore::Error::Partial(errs) => errs.iter().find_map(walk_error_path),
        _ => None,
    }
}

fn walk_diagnostic(root: &Path, err: &ignore::Error) -> Diagnostic {
    let path = walk_error_path(err)
        .map(|p| relative_path(root, p))
        .unwrap_or_default();
    warn!(path = %path, error = %err, "walk entry skipped");
    Diagnostic::parse_failure(&path, Phase::Discovery, err.to_string())
}

/// Collect every `.py` file under `root`, minus exclusion globs.
///
/// A single-file root is analyzed with its parent directory as the root.
/// Respects .gitignore and skips hidden entries.
pub fn discover(root: &Path, excludes: &[String]) -> Result<Discovery> {
    if !root.exists() {
        return Err(MapperError::RootNotFound(root.to_path_buf()));
    }

    if root.is_file() {
        if !is_python_source(root) {
            return Err(MapperError::NoSourceFiles(root.to_path_buf()));
        }
        let parent = root
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        return Ok(Discovery {
            root: parent,
            files: vec![root.to_path_buf()],
            diagnostics: Vec::new(),
        });
    }

    let mut overrides = OverrideBuilder::new(root);
    for pattern in excludes {
        overrides
            .add(&format!("!{pattern}"))
            .map_err(|e| MapperError::InvalidPattern(format!("{pattern}: {e}")))?;
    }
    let overrides = overrides
        .build()
        .map_err(|e| MapperError::InvalidPattern(e.to_string()))?;

    let mut diagnostics = Vec::new();
    let mut files: Vec<(String, PathBuf)> = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .require_git(false)
        .add_custom_ignore_filename(IGNORE_FILENAME)
        .overrides(overrides)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => {
                if let Some(e) = entry.error() {
                    diagnostics.push(walk_diagnostic(root, e));
                }
                Some(entry)
            }
            Err(e) => {
                diagnostics.push(walk_diagnostic(root, &e));
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| !is_builtin_ignored(root, entry.path()))
        .filter(|entry| is_python_source(entry.path()))
        .map(|entry| {
            let path = entry.into_path();
            (relative_path(root, &path), path)
        })
        .collect();

    if files.is_empty() {
        return Err(MapperError::NoSourceFiles(root.to_path_buf()));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    info!(root = %root.display(), files = files.len(), "discovered source files");

    Ok(Discovery {
        root: root.to_path_buf(),
        files: files.into_iter().map(|(_, path)| path).collect(),
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x = 1\n").unwrap();
    }

    fn relatives(discovery: &Discovery) -> Vec<String> {
        discovery
            .files
            .iter()
            .map(|p| relative_path(&discovery.root, p))
            .collect()
    }

    #[test]
    fn test_discovers_sorted_python_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.py");
        touch(dir.path(), "a.py");
        touch(dir.path(), "pkg/mod.py");
        touch(dir.path(), "pkg/notes.txt");
        touch(dir.path(), "pkg/__pycache__/mod.py");
        touch(dir.path(), ".hidden/secret.py");
        touch(dir.path(), "venv/lib/site.py");

        let discovery = discover(dir.path(), &[]).unwrap();
        assert_eq!(relatives(&discovery), vec!["a.py", "b.py", "pkg/mod.py"]);
    }

    #[test]
    fn test_exclusion_globs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app/core.py");
        touch(dir.path(), "app/tests/test_core.py");
        touch(dir.path(), "scratch.py");

        let excludes = vec!["tests/".to_string(), "scratch.py".to_string()];
        let discovery = discover(dir.path(), &excludes).unwrap();
        assert_eq!(relatives(&discovery), vec!["app/core.py"]);
    }

    #[test]
    fn test_ignore_file_is_honoured() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "keep.py");
        touch(dir.path(), "generated/out.py");
        fs::write(dir.path().join(IGNORE_FILENAME), "generated/\n").unwrap();

        let discovery = discover(dir.path(), &[]).unwrap();
        assert_eq!(relatives(&discovery), vec!["keep.py"]);
        assert!(discovery.diagnostics.is_empty());
    }

    #[test]
    fn test_broken_ignore_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "keep.py");
        fs::write(dir.path().join(IGNORE_FILENAME), "[\n").unwrap();

        let discovery = discover(dir.path(), &[]).unwrap();
        assert_eq!(relatives(&discovery), vec!["keep.py"]);
        assert_eq!(discovery.diagnostics.len(), 1);
        let diagnostic = &discovery.diagnostics[0];
        assert_eq!(diagnostic.phase, Phase::Discovery);
        assert_eq!(diagnostic.path, IGNORE_FILENAME);
    }

    #[test]
    fn test_single_file_root_uses_parent() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "solo.py");

        let discovery = discover(&dir.path().join("solo.py"), &[]).unwrap();
        assert_eq!(discovery.root, dir.path());
        assert_eq!(relatives(&discovery), vec!["solo.py"]);
    }

    #[test]
    fn test_fatal_conditions() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            discover(&missing, &[]),
            Err(MapperError::RootNotFound(_))
        ));

        touch(dir.path(), "README.txt");
        assert!(matches!(
            discover(dir.path(), &[]),
            Err(MapperError::NoSourceFiles(_))
        ));

        touch(dir.path(), "a.py");
        assert!(matches!(
            discover(dir.path(), &["[".to_string()]),
            Err(MapperError::InvalidPattern(_))
        ));
    }
}
