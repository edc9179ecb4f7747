//! Core types for sensor node measurements.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::{ParseError, ParseResult};

/// Number of raw units per display unit (readings are stored in tenths).
pub const TENTHS_PER_UNIT: i32 = 10;

/// Layout of [`Measurement::created_at_display`]: `dd/mm/YYYY HH:MM:SS`.
pub const DISPLAY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]/[month]/[year] [hour]:[minute]:[second]");

/// Convert a tenths-of-unit reading into display units.
///
/// This is a presentation helper; stores never call it.
///
/// # Examples
///
/// ```
/// use sensornode_types::tenths_to_unit;
///
/// assert_eq!(tenths_to_unit(215), 21.5);
/// assert_eq!(tenths_to_unit(-35), -3.5);
/// ```
#[must_use]
pub fn tenths_to_unit(tenths: i32) -> f32 {
    tenths as f32 / TENTHS_PER_UNIT as f32
}

/// The local UTC offset, or UTC when the platform cannot report one.
///
/// On Unix the offset is only available while the process is single
/// threaded, so callers must tolerate the UTC fallback.
#[must_use]
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// One recorded scalar reading.
///
/// `value` is a fixed-point quantity in tenths of a unit (e.g. `215` is
/// 21.5 °C). It is kept exactly as written; use [`Measurement::value_in_units`]
/// at the presentation boundary.
///
/// `id` is either a relational row id or a ring-buffer slot index, so it is
/// not unique across backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    id: u64,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    created_at: OffsetDateTime,
    value: i32,
}

impl Default for Measurement {
    fn default() -> Self {
        Self {
            id: 0,
            created_at: OffsetDateTime::UNIX_EPOCH,
            value: 0,
        }
    }
}

impl Measurement {
    /// Create a measurement from its parts.
    #[must_use]
    pub fn new(id: u64, created_at: OffsetDateTime, value: i32) -> Self {
        Self {
            id,
            created_at,
            value,
        }
    }

    /// Create a measurement from seconds since the Unix epoch.
    ///
    /// The instant is expressed in the local offset. Timestamps outside the
    /// representable range collapse to the epoch; the clock that produced
    /// them is never validated.
    #[must_use]
    pub fn from_unix(id: u64, unix_seconds: i64, value: i32) -> Self {
        let created_at = OffsetDateTime::from_unix_timestamp(unix_seconds)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
            .to_offset(local_offset());
        Self::new(id, created_at, value)
    }

    /// Create a measurement from a `dd/mm/YYYY HH:MM:SS` display string,
    /// interpreted in the local offset.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidTimestamp`] if the string does not match
    /// [`DISPLAY_FORMAT`].
    pub fn from_display(id: u64, created_at: &str, value: i32) -> ParseResult<Self> {
        let naive = PrimitiveDateTime::parse(created_at.trim(), DISPLAY_FORMAT).map_err(|e| {
            ParseError::InvalidTimestamp {
                input: created_at.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self::new(id, naive.assume_offset(local_offset()), value))
    }

    /// Row id or slot index.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// When the measurement was written.
    #[must_use]
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Seconds since the Unix epoch.
    #[must_use]
    pub fn unix_timestamp(&self) -> i64 {
        self.created_at.unix_timestamp()
    }

    /// Raw reading in tenths of a unit.
    #[must_use]
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Reading converted to display units.
    #[must_use]
    pub fn value_in_units(&self) -> f32 {
        tenths_to_unit(self.value)
    }

    /// `created_at` rendered as `dd/mm/YYYY HH:MM:SS` in its own offset.
    #[must_use]
    pub fn created_at_display(&self) -> String {
        self.created_at
            .format(DISPLAY_FORMAT)
            .unwrap_or_else(|_| self.created_at.unix_timestamp().to_string())
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {:.1}",
            self.id,
            self.created_at_display(),
            self.value_in_units()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_default_is_zeroed() {
        let m = Measurement::default();
        assert_eq!(m.id(), 0);
        assert_eq!(m.value(), 0);
        assert_eq!(m.unix_timestamp(), 0);
    }

    #[test]
    fn test_value_is_kept_exact() {
        let m = Measurement::new(3, datetime!(2026-02-14 08:30:00 UTC), -1234);
        assert_eq!(m.value(), -1234);
        assert!((m.value_in_units() - -123.4).abs() < 0.001);
    }

    #[test]
    fn test_display_format() {
        let m = Measurement::new(7, datetime!(2026-02-04 09:05:03 +1), 215);
        assert_eq!(m.created_at_display(), "04/02/2026 09:05:03");
        assert_eq!(m.to_string(), "#7 04/02/2026 09:05:03 21.5");
    }

    #[test]
    fn test_from_unix_keeps_instant() {
        let m = Measurement::from_unix(1, 1_771_000_000, 200);
        assert_eq!(m.unix_timestamp(), 1_771_000_000);
    }

    #[test]
    fn test_from_unix_out_of_range_falls_back_to_epoch() {
        let m = Measurement::from_unix(1, i64::MAX, 200);
        assert_eq!(m.unix_timestamp(), 0);
        assert_eq!(m.value(), 200);
    }

    #[test]
    fn test_from_display_roundtrip() {
        let m = Measurement::from_display(4, "14/02/2026 12:00:30", 180).unwrap();
        assert_eq!(m.created_at_display(), "14/02/2026 12:00:30");
        assert_eq!(m.id(), 4);
    }

    #[test]
    fn test_from_display_rejects_garbage() {
        let err = Measurement::from_display(0, "yesterday", 0).unwrap_err();
        assert!(matches!(err, ParseError::InvalidTimestamp { .. }));
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn test_tenths_to_unit() {
        assert_eq!(tenths_to_unit(0), 0.0);
        assert_eq!(tenths_to_unit(10), 1.0);
        assert_eq!(tenths_to_unit(-5), -0.5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_rfc3339() {
        let m = Measurement::new(2, datetime!(2026-02-14 08:30:00 UTC), 215);
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"created_at\":\"2026-02-14T08:30:00Z\""));
        assert!(json.contains("\"value\":215"));
        let back: Measurement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
