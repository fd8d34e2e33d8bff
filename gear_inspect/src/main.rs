//! gear-inspect - load gear definitions and query stats, traits and repairs from the shell

mod args;
mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Stats(args) => commands::stats(args),
        Commands::Traits(args) => commands::traits(args),
        Commands::Repair(args) => commands::repair_gear(args),
        Commands::Dump(args) => commands::dump(args),
    }
}
