//! `decode`: compact map in, verbose map out.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::output::{self, OutputFormat};

pub fn run(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let compact = output::read_json(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let verbose = output::decode_to_verbose(&compact)
        .with_context(|| format!("failed to decode {}", input.display()))?;

    match output {
        Some(path) => {
            output::write_json(&path, &verbose, OutputFormat::Verbose)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("✓ Decoded {} to {}", input.display(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&verbose)?),
    }
    Ok(())
}
