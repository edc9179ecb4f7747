//! Output formatting utilities for text, JSON, and CSV output.
//!
//! Raw readings are tenths of a unit; this is the only place they are
//! divided by ten.

use anyhow::Result;
use serde::Serialize;
use sensornode_store::{Backend, StoreStatus};
use sensornode_types::Measurement;

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Omit header row in CSV output.
    pub no_header: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    /// Create with no_header option for CSV output.
    pub fn with_no_header(mut self, no_header: bool) -> Self {
        self.no_header = no_header;
        self
    }

    /// Create with compact JSON option.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }

    /// Serialize rows to CSV, respecting no_header option.
    ///
    /// `headers` must match the field names of `T`; they are written
    /// explicitly when there are no rows to derive them from.
    fn as_csv<T: Serialize>(&self, headers: &[&str], rows: &[T]) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(!self.no_header)
            .from_writer(Vec::new());
        if rows.is_empty() && !self.no_header {
            writer.write_record(headers)?;
        }
        for row in rows {
            writer.serialize(row)?;
        }
        Ok(String::from_utf8(writer.into_inner()?)?)
    }
}

const MEASUREMENT_HEADERS: [&str; 5] = ["id", "created_at", "timestamp", "raw", "value"];

/// One measurement as presented to users.
#[derive(Debug, Serialize)]
struct MeasurementRow {
    id: u64,
    created_at: String,
    timestamp: i64,
    raw: i32,
    value: f32,
}

impl From<&Measurement> for MeasurementRow {
    fn from(m: &Measurement) -> Self {
        Self {
            id: m.id(),
            created_at: m.created_at_display(),
            timestamp: m.unix_timestamp(),
            raw: m.value(),
            value: m.value_in_units(),
        }
    }
}

fn rows(measurements: &[Measurement]) -> Vec<MeasurementRow> {
    measurements.iter().map(MeasurementRow::from).collect()
}

/// Format measurements as aligned text, newest first.
pub fn format_measurements_text(measurements: &[Measurement]) -> String {
    if measurements.is_empty() {
        return "No measurements stored.\n".to_string();
    }
    let mut output = String::new();
    for m in measurements {
        output.push_str(&format!(
            "{:>5}  {}  {:>8.1}\n",
            m.id(),
            m.created_at_display(),
            m.value_in_units()
        ));
    }
    output
}

/// Format measurements as a JSON array.
pub fn format_measurements_json(
    measurements: &[Measurement],
    opts: &FormatOptions,
) -> Result<String> {
    opts.as_json(&rows(measurements))
}

/// Format measurements as CSV.
pub fn format_measurements_csv(
    measurements: &[Measurement],
    opts: &FormatOptions,
) -> Result<String> {
    opts.as_csv(&MEASUREMENT_HEADERS, &rows(measurements))
}

/// Format store status as text.
pub fn format_status_text(status: &StoreStatus) -> String {
    let mut output = format!("Backend:     {}\n", status.backend);
    match (status.backend, status.capacity, status.write_index) {
        (Backend::Ring, Some(capacity), Some(write_index)) => {
            output.push_str(&format!("Stored:      {} / {}\n", status.stored, capacity));
            output.push_str(&format!("Next slot:   {}\n", write_index));
        }
        _ => output.push_str(&format!("Stored:      {}\n", status.stored)),
    }
    output
}

/// Format store status as JSON.
pub fn format_status_json(status: &StoreStatus, opts: &FormatOptions) -> Result<String> {
    opts.as_json(status)
}

/// Format store status as a single CSV record.
pub fn format_status_csv(status: &StoreStatus, opts: &FormatOptions) -> Result<String> {
    #[derive(Serialize)]
    struct StatusRow {
        backend: String,
        stored: u64,
        capacity: Option<usize>,
        write_index: Option<usize>,
    }

    opts.as_csv(
        &["backend", "stored", "capacity", "write_index"],
        &[StatusRow {
            backend: status.backend.to_string(),
            stored: status.stored,
            capacity: status.capacity,
            write_index: status.write_index,
        }],
    )
}
