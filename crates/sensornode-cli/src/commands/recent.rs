//! Recent command implementation.

use anyhow::{Context, Result};
use sensornode_store::{MeasurementStore, StorageConfig};

use crate::cli::{OutputArgs, OutputFormat};
use crate::format::{
    FormatOptions, format_measurements_csv, format_measurements_json, format_measurements_text,
};
use crate::util::{open_store, write_output};

pub fn cmd_recent(storage: &StorageConfig, limit: u16, output: &OutputArgs) -> Result<()> {
    let store = open_store(storage)?;
    let measurements = store
        .read_recent(limit)
        .context("Failed to read measurements")?;

    let opts = FormatOptions::default()
        .with_no_header(output.no_header)
        .with_compact(output.compact);

    let content = match output.format {
        OutputFormat::Json => format_measurements_json(&measurements, &opts)?,
        OutputFormat::Csv => format_measurements_csv(&measurements, &opts)?,
        OutputFormat::Text => format_measurements_text(&measurements),
    };

    write_output(output.output.as_ref(), &content)
}
