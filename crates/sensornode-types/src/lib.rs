//! Platform-agnostic types for sensor node measurements.
//!
//! This crate provides the value types shared by the storage layer and
//! whatever presents the data (command line, web front end).
//!
//! # Features
//!
//! - The [`Measurement`] record (id, creation instant, raw reading)
//! - Tenths-of-unit conversion for display
//! - Local `dd/mm/YYYY HH:MM:SS` timestamp rendering
//!
//! # Example
//!
//! ```
//! use sensornode_types::Measurement;
//!
//! let m = Measurement::from_unix(0, 1_771_000_000, 215);
//! assert_eq!(m.value(), 215);
//! assert_eq!(m.value_in_units(), 21.5);
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{DISPLAY_FORMAT, Measurement, TENTHS_PER_UNIT, local_offset, tenths_to_unit};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_from_unix_preserves_value_and_instant(
            id in 0u64..10_000,
            secs in 0i64..4_102_444_800,
            value in any::<i32>(),
        ) {
            let m = Measurement::from_unix(id, secs, value);
            prop_assert_eq!(m.id(), id);
            prop_assert_eq!(m.value(), value);
            prop_assert_eq!(m.unix_timestamp(), secs);
        }

        #[test]
        fn prop_display_parses_back(secs in 0i64..4_102_444_800) {
            let m = Measurement::from_unix(0, secs, 0);
            let parsed = Measurement::from_display(0, &m.created_at_display(), 0).unwrap();
            prop_assert_eq!(parsed.created_at_display(), m.created_at_display());
        }
    }
}
