//! Shared helpers for command implementations.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use sensornode_store::{StorageConfig, Store};

/// Open the configured store, adding the backend and path to any error.
pub fn open_store(storage: &StorageConfig) -> Result<Store> {
    Store::open(storage).with_context(|| {
        format!(
            "Failed to open {} store at {}",
            storage.backend,
            storage.path.display()
        )
    })
}

/// Write output to file or stdout.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
