use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;
pub mod runner;

#[derive(Parser)]
#[command(name = "tributo")]
#[command(
    version,
    about = "Brazilian corporate tax regime simulator with dual-VAT reform projection"
)]
#[command(
    long_about = "Compare a company's tax burden under Simples Nacional, Lucro Presumido and Lucro Real from its income statement, and project the dual-VAT reform (IBS/CBS) on top of the best current regime."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the four-way regime comparison over a ledger CSV file
    Simulate {
        /// Path to the ledger CSV file (semicolon-delimited)
        file: String,

        /// Business activity: comercio, industria, servicos, anexo-iv, anexo-v
        #[arg(short, long)]
        activity: String,

        /// Rate configuration TOML (defaults to the documented rates)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Persist the simulation under this name
        #[arg(long)]
        save: Option<String>,

        /// Export the comparison to a CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Classify a ledger CSV and show the tagged lines and summary
    Classify {
        /// Path to the ledger CSV file (semicolon-delimited)
        file: String,
    },

    /// Saved simulations management
    Simulations {
        #[command(subcommand)]
        action: SimulationsCommands,
    },

    /// Rate configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum SimulationsCommands {
    /// List saved simulations
    List,

    /// Re-run and show a saved simulation
    Show {
        /// Simulation name
        name: String,
    },

    /// Remove a saved simulation
    Remove {
        /// Simulation name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write the documented default rates to a TOML file
    Init {
        /// Destination path (defaults to the user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Configuration file to read (defaults to the user config directory)
        path: Option<PathBuf>,
    },
}
