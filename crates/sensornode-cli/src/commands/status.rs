//! Status command implementation.

use anyhow::{Context, Result};
use sensornode_store::StorageConfig;

use crate::cli::{OutputArgs, OutputFormat};
use crate::format::{FormatOptions, format_status_csv, format_status_json, format_status_text};
use crate::util::{open_store, write_output};

pub fn cmd_status(storage: &StorageConfig, output: &OutputArgs) -> Result<()> {
    let store = open_store(storage)?;
    let status = store.status().context("Failed to read store status")?;

    let opts = FormatOptions::default()
        .with_no_header(output.no_header)
        .with_compact(output.compact);

    let content = match output.format {
        OutputFormat::Json => format_status_json(&status, &opts)?,
        OutputFormat::Csv => format_status_csv(&status, &opts)?,
        OutputFormat::Text => {
            let mut text = format_status_text(&status);
            text.push_str(&format!("Path:        {}\n", storage.path.display()));
            text
        }
    };

    write_output(output.output.as_ref(), &content)
}
