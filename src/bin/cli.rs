//! integration-map CLI - map Python codebases and decode compact maps.

use clap::Parser;
use integration_map::cli::{self, Cli, Commands};

fn main() {
    let args = Cli::parse();
    cli::init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Cli) -> anyhow::Result<()> {
    match args.command {
        Commands::Map {
            root,
            output,
            exclude,
            compact,
        } => cli::map::run(&root, output, exclude, compact),
        Commands::Decode { input, output } => cli::decode::run(&input, output),
    }
}
