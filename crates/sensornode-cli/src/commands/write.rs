//! Commands that change the store.

use anyhow::{Context, Result};
use sensornode_store::{MeasurementStore, StorageConfig};
use sensornode_types::tenths_to_unit;

use crate::util::open_store;

pub fn cmd_init(storage: &StorageConfig, quiet: bool) -> Result<()> {
    let mut store = open_store(storage)?;
    store
        .create_if_absent()
        .context("Failed to create storage area")?;

    if !quiet {
        eprintln!(
            "{} store ready at {}",
            storage.backend,
            storage.path.display()
        );
    }
    Ok(())
}

pub fn cmd_write(storage: &StorageConfig, value: i32, quiet: bool) -> Result<()> {
    let mut store = open_store(storage)?;
    store
        .write(value)
        .with_context(|| format!("Failed to store measurement {}", value))?;

    if !quiet {
        eprintln!("Stored {:.1}", tenths_to_unit(value));
    }
    Ok(())
}

pub fn cmd_exec(storage: &StorageConfig, sql: &str, quiet: bool) -> Result<()> {
    let mut store = open_store(storage)?;
    store
        .execute(sql)
        .with_context(|| format!("Failed to execute: {}", sql))?;

    if !quiet {
        eprintln!("OK");
    }
    Ok(())
}
