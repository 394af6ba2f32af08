//! `map`: analyze a codebase and write the result.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::MapperConfig;
use crate::output::{self, OutputFormat};
use crate::{map_codebase, IntegrationMap, MapOptions};

/// Settings after merging CLI flags over `integration-map.toml`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub excludes: Vec<String>,
    pub format: OutputFormat,
    pub output: PathBuf,
}

impl MapSettings {
    /// CLI flags win; config excludes are kept and CLI excludes appended.
    pub fn resolve(
        root: &Path,
        config: &MapperConfig,
        output: Option<PathBuf>,
        exclude: Vec<String>,
        compact: bool,
    ) -> Self {
        let base = if root.is_file() {
            root.parent().unwrap_or(root)
        } else {
            root
        };
        let mut excludes = config.project.exclude.clone();
        excludes.extend(exclude);

        Self {
            excludes,
            format: if compact {
                OutputFormat::Compact
            } else {
                config.output.format
            },
            output: output.unwrap_or_else(|| config.resolve_output_path(base)),
        }
    }
}

pub fn run(root: &Path, output: Option<PathBuf>, exclude: Vec<String>, compact: bool) -> Result<()> {
    let config = MapperConfig::load_from_root(root);
    let settings = MapSettings::resolve(root, &config, output, exclude, compact);

    let map = map_codebase(
        root,
        &MapOptions {
            excludes: settings.excludes.clone(),
        },
    )
    .with_context(|| format!("failed to map {}", root.display()))?;

    let document = output::render(&map, settings.format);
    output::write_json(&settings.output, &document, settings.format)
        .with_context(|| format!("failed to write {}", settings.output.display()))?;

    print_summary(&map, &settings);
    Ok(())
}

fn print_summary(map: &IntegrationMap, settings: &MapSettings) {
    let summary = &map.summary;
    println!(
        "✓ Mapped {} of {} files ({} failed)",
        summary.files_analyzed, summary.files_discovered, summary.files_failed
    );
    println!(
        "  {} components, {} integration points",
        summary.components_found, summary.total_integration_points
    );
    println!(
        "  {} crossroads, {} critical paths",
        summary.total_crossroads, summary.total_critical_paths
    );
    if !map.diagnostics.is_empty() {
        println!("  {} diagnostics", map.diagnostics.len());
    }
    println!(
        "✓ Wrote {} map to {}",
        settings.format.as_str(),
        settings.output.display()
    );
}
