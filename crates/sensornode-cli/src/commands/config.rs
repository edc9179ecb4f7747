//! Config command implementation.

use std::path::Path;

use anyhow::Result;

use crate::cli::ConfigAction;
use crate::config::Config;

pub fn cmd_config(action: ConfigAction, config: &Config, path: &Path, quiet: bool) -> Result<()> {
    match action {
        ConfigAction::Show => print!("{}", config.to_toml()?),
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Save => {
            config.validate()?;
            config.save(path)?;
            if !quiet {
                eprintln!("Configuration written to {}", path.display());
            }
        }
        ConfigAction::Validate => {
            config.validate()?;
            if !quiet {
                eprintln!("Configuration is valid");
            }
        }
    }
    Ok(())
}
