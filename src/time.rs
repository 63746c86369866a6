//! Epoch-millisecond timestamp derivation
//!
//! The source events carry an epoch timestamp in milliseconds (`ts`). Both
//! the Time Table and the Songplays fact derive calendar fields from it, so
//! the conversion lives in exactly one place: [`epoch_millis_to_datetime`].
//! Divergent copies of this formula were a consistency hazard in the system
//! this job replaces.
//!
//! Conventions, fixed rather than inherited from the host:
//! - Timezone is **UTC**.
//! - Seconds are derived by integer division (`ms / 1000`); sub-second
//!   precision is dropped.
//! - Weekday numbering is **1 = Sunday .. 7 = Saturday**.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

/// Render format for `start_time` values in all derived tables
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert an epoch-millisecond value to a UTC instant
///
/// Returns `None` only for values outside chrono's representable range.
pub fn epoch_millis_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    let seconds = ms.div_euclid(1000);
    Utc.timestamp_opt(seconds, 0).single()
}

/// Render an instant as a `start_time` string
pub fn format_start_time(instant: DateTime<Utc>) -> String {
    instant.format(START_TIME_FORMAT).to_string()
}

/// Calendar breakdown of one instant
///
/// Every field is derived from the same instant, so a row is internally
/// consistent by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeParts {
    /// The instant, rendered with [`START_TIME_FORMAT`]
    pub start_time: String,
    /// Hour of day, 0..=23
    pub hour: u32,
    /// Day of month, 1..=31
    pub day: u32,
    /// ISO week of year, 1..=53
    pub week: u32,
    /// Month, 1..=12
    pub month: u32,
    /// Calendar year
    pub year: i32,
    /// Day of week, 1 = Sunday .. 7 = Saturday
    pub weekday: u32,
}

impl TimeParts {
    /// Break an epoch-millisecond value into calendar fields
    pub fn from_millis(ms: i64) -> Option<Self> {
        let instant = epoch_millis_to_datetime(ms)?;
        Some(Self::from_instant(instant))
    }

    /// Break an instant into calendar fields
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self {
            start_time: format_start_time(instant),
            hour: instant.hour(),
            day: instant.day(),
            week: instant.iso_week().week(),
            month: instant.month(),
            year: instant.year(),
            weekday: instant.weekday().num_days_from_sunday() + 1,
        }
    }
}
