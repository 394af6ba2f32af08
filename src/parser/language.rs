//
//  language.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

use std::path::Path;

use tree_sitter::Language;

/// The tree-sitter grammar used for every source file.
pub fn python_language() -> Language {
    tree_sitter_python::LANGUAGE.into()
}

/// Whether a path is a Python source file we index.
pub fn is_python_source(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("py")
}
