//
//  mod.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

//! Serialized forms of an [`IntegrationMap`].
//!
//! - [`verbose`]: nested tree plus full edge objects.
//! - [`compact`]: integer IDs and positional arrays, decodable by [`decoder`].

pub mod codes;
pub mod compact;
pub mod decoder;
pub mod indexer;
pub mod verbose;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::IntegrationMap;

pub use compact::encode;
pub use decoder::{decode_compact, decode_to_verbose};
pub use indexer::ComponentIndexer;

/// Which layout to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Verbose,
    Compact,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Verbose => "verbose",
            OutputFormat::Compact => "compact",
        }
    }
}

/// Render `map` in the requested layout.
pub fn render(map: &IntegrationMap, format: OutputFormat) -> Value {
    match format {
        OutputFormat::Verbose => verbose::render(map),
        OutputFormat::Compact => compact::encode(map),
    }
}

/// Write a rendered document, creating parent directories as needed.
/// Verbose output is pretty-printed; compact output stays on one line.
pub fn write_json(path: &Path, value: &Value, format: OutputFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let text = match format {
        OutputFormat::Verbose => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
    };
    fs::write(path, text)?;
    debug!(path = %path.display(), format = format.as_str(), "map written");
    Ok(())
}

/// Read a JSON document from disk.
pub fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_creates_parents_and_formats() {
        let dir = tempfile::tempdir().unwrap();
        let value = serde_json::json!({"a": [1, 2]});

        let pretty = dir.path().join("out/verbose.json");
        write_json(&pretty, &value, OutputFormat::Verbose).unwrap();
        assert!(fs::read_to_string(&pretty).unwrap().contains('\n'));

        let compact = dir.path().join("out/compact.json");
        write_json(&compact, &value, OutputFormat::Compact).unwrap();
        assert_eq!(fs::read_to_string(&compact).unwrap(), r#"{"a":[1,2]}"#);
        assert_eq!(read_json(&compact).unwrap(), value);
    }

    #[test]
    fn test_format_parses_lowercase() {
        #[derive(Deserialize)]
        struct Holder {
            format: OutputFormat,
        }
        let holder: Holder = toml::from_str("format = \"compact\"").unwrap();
        assert_eq!(holder.format, OutputFormat::Compact);
        assert_eq!(OutputFormat::default(), OutputFormat::Verbose);
    }
}
