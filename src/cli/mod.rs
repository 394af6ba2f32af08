//! CLI module for integration-map.
//!
//! Commands:
//! - map: analyze a codebase and write the integration map
//! - decode: expand a compact map back into the verbose layout

pub mod decode;
pub mod map;

use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "integration-map")]
#[command(about = "Integration graph for Python codebases", long_about = None)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a directory (or single file) and write the map
    Map {
        /// Project root or a single .py file
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Output file (default: from integration-map.toml, else integration_map.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Glob pattern to exclude, relative to the root (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Write the compact, ID-based format
        #[arg(long)]
        compact: bool,
    },

    /// Decode a compact map into the verbose layout
    Decode {
        /// Compact map file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Install the stderr subscriber.
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_map_arguments() {
        let cli = Cli::try_parse_from([
            "integration-map",
            "-vv",
            "map",
            "--root",
            "src",
            "-e",
            "tests/",
            "-e",
            "build/",
            "--compact",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Map {
                root,
                output,
                exclude,
                compact,
            } => {
                assert_eq!(root, PathBuf::from("src"));
                assert!(output.is_none());
                assert_eq!(exclude, vec!["tests/", "build/"]);
                assert!(compact);
            }
            Commands::Decode { .. } => panic!("expected map"),
        }
    }
}
