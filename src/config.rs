//
//  config.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::output::OutputFormat;

/// Config file looked up in the analyzed root.
pub const CONFIG_FILENAME: &str = "integration-map.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapperConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Project-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Glob patterns excluded from discovery, relative to the root.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Output file, relative to the analyzed root.
    #[serde(default = "default_output_path")]
    pub path: String,
}

fn default_output_path() -> String {
    "integration_map.json".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            path: default_output_path(),
        }
    }
}

impl MapperConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Load `integration-map.toml` from a project root (or a single file's
    /// directory).
    pub fn load_from_root(root: &Path) -> Self {
        let dir = if root.is_file() {
            root.parent().unwrap_or(root)
        } else {
            root
        };
        Self::load(&dir.join(CONFIG_FILENAME))
    }

    /// Resolve the output path relative to the project root.
    pub fn resolve_output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output.path)
    }
}
