//! `sensornode`: inspect and feed a sensor node measurement store.

mod cli;
mod commands;
mod config;
mod format;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::{cmd_config, cmd_exec, cmd_init, cmd_recent, cmd_status, cmd_write};
use crate::config::{Config, default_config_path};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Quiet keeps warnings; RUST_LOG applies only when neither flag is given
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    }?
    .with_overrides(&cli.storage);
    tracing::debug!("Effective configuration: {:?}", config);

    if !matches!(cli.command, Commands::Config { .. }) {
        config.validate()?;
    }
    let storage = &config.storage;

    match cli.command {
        Commands::Init => cmd_init(storage, cli.quiet),
        Commands::Write { value } => cmd_write(storage, value, cli.quiet),
        Commands::Exec { sql } => cmd_exec(storage, &sql, cli.quiet),
        Commands::Recent { limit, output } => cmd_recent(storage, limit, &output),
        Commands::Status { output } => cmd_status(storage, &output),
        Commands::Config { action } => cmd_config(action, &config, &config_path, cli.quiet),
    }
}
