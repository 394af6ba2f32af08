//
//  error.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while mapping a codebase.
///
/// Only a missing root, an empty root and a bad exclusion pattern escape
/// `map_codebase`. Everything else is scoped to one file and ends up as a
/// diagnostic.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("root path not found: {0}")]
    RootNotFound(PathBuf),

    #[error("no Python source files found under {0}")]
    NoSourceFiles(PathBuf),

    #[error("invalid exclude pattern: {0}")]
    InvalidPattern(String),

    #[error("failed to initialise parser for {0}: {1}")]
    ParserInit(PathBuf, String),

    #[error("syntax error in {path} at line {line}")]
    Syntax { path: PathBuf, line: usize },

    #[error("tree-sitter failed to parse {0}")]
    ParseFailed(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed compact map: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, MapperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_message_names_line() {
        let err = MapperError::Syntax {
            path: PathBuf::from("pkg/mod.py"),
            line: 12,
        };
        assert_eq!(err.to_string(), "syntax error in pkg/mod.py at line 12");
    }
}
