//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sensornode_store::Backend;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Parser)]
#[command(name = "sensornode")]
#[command(author, version, about = "Inspect and feed a sensor node measurement store", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "SENSORNODE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the configured storage
#[derive(Debug, Clone, Default, Args)]
pub struct StorageArgs {
    /// Storage backend (ring or relational)
    #[arg(short, long, global = true, env = "SENSORNODE_BACKEND")]
    pub backend: Option<Backend>,

    /// Storage directory
    #[arg(short, long, global = true, env = "SENSORNODE_PATH")]
    pub path: Option<PathBuf>,

    /// Ring namespace
    #[arg(long, global = true)]
    pub namespace: Option<String>,
}

/// Reusable output arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Omit header row in CSV output
    #[arg(long)]
    pub no_header: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(long)]
    pub compact: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the storage area if it does not exist
    Init,

    /// Record one measurement
    Write {
        /// Raw value in tenths of a unit (e.g. 215 for 21.5)
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },

    /// Run a statement written for the relational API
    Exec {
        /// Statement text, e.g. "INSERT INTO measurements (value) VALUES (215);"
        sql: String,
    },

    /// Show the most recent measurements, newest first
    Recent {
        /// Number of measurements to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: u16,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show what the store currently holds
    Status {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Show config file path
    Path,

    /// Write the effective configuration to the config file
    Save,

    /// Check the effective configuration for errors
    Validate,
}
