mod cli;
mod config;
mod db;
mod error;
mod importers;
mod ledger;
mod regimes;
mod reports;
mod utils;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG controls verbosity)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Cli::parse();
    cli::runner::run(args)
}
