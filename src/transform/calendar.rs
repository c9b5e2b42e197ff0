//! Timestamp decomposition
//!
//! Event `ts` values are epoch milliseconds. They are truncated to whole
//! seconds and read in UTC. Week and weekday follow ISO-8601: weeks start on
//! Monday, week 1 contains the year's first Thursday, and `day_of_week` runs
//! from Monday = 1 to Sunday = 7.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Start time of an event from its `ts` (ms since epoch)
///
/// Sub-second precision is dropped (`ts / 1000`, truncating toward zero).
/// Returns `None` when the instant is outside chrono's range.
pub fn start_time_from_millis(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts / 1000, 0)
}

/// Calendar columns derived from a start time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub year: i32,
    pub month: i32,
    pub week: i32,
    pub day: i32,
    pub hour: i32,
    pub day_of_week: i32,
}

impl CalendarFields {
    /// Decompose a UTC instant
    pub fn from_time(time: &DateTime<Utc>) -> Self {
        Self {
            year: time.year(),
            month: time.month() as i32,
            week: time.iso_week().week() as i32,
            day: time.day() as i32,
            hour: time.hour() as i32,
            day_of_week: time.weekday().number_from_monday() as i32,
        }
    }
}
