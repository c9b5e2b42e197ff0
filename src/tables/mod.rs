//! Output table schemas
//!
//! Typed rows for the five output tables and their conversion to and from
//! Arrow `RecordBatch`es.
//!
//! # Overview
//!
//! | Table | Row type | Partitioned by |
//! |---|---|---|
//! | `songs` | [`Song`] | year, artist_id |
//! | `artists` | [`Artist`] | - |
//! | `users` | [`User`] | - |
//! | `time` | [`TimeEntry`] | year, month |
//! | `songplays` | [`SongPlay`] | year, month |
//!
//! `start_time` columns are `Timestamp(Millisecond, "UTC")` holding whole
//! seconds.

mod columns;
mod rows;

pub use columns::{format_start_time, start_time_type};
pub use rows::{table_schema, Artist, Song, SongPlay, TableRow, TimeEntry, User};

#[cfg(test)]
mod tests;
