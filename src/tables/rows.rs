//! Output row types

use super::columns::{self, opt, opt_str, opt_time, start_time_type, Columns};
use crate::error::Result;
use crate::types::TableName;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A row type backed by one output table
pub trait TableRow: Sized {
    /// The table these rows belong to
    const TABLE: TableName;

    /// Full table schema, partition columns included
    fn schema() -> SchemaRef;

    /// Convert rows to a batch with [`TableRow::schema`]
    fn to_batch(rows: &[Self]) -> Result<RecordBatch>;

    /// Convert a batch with [`TableRow::schema`] back to rows
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>>;
}

/// Full schema of any output table
pub fn table_schema(table: TableName) -> SchemaRef {
    match table {
        TableName::Songs => Song::schema(),
        TableName::Artists => Artist::schema(),
        TableName::Users => User::schema(),
        TableName::Time => TimeEntry::schema(),
        TableName::Songplays => SongPlay::schema(),
    }
}

// ============================================================================
// songs
// ============================================================================

/// Row of the `songs` dimension
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub song_id: String,
    pub title: Option<String>,
    pub artist_id: Option<String>,
    pub year: Option<i32>,
    pub duration: Option<f64>,
}

impl TableRow for Song {
    const TABLE: TableName = TableName::Songs;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("song_id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("year", DataType::Int32, true),
            Field::new("duration", DataType::Float64, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                columns::utf8(rows.iter().map(|r| Some(r.song_id.as_str()))),
                columns::utf8(rows.iter().map(|r| r.title.as_deref())),
                columns::utf8(rows.iter().map(|r| r.artist_id.as_deref())),
                columns::int32(rows.iter().map(|r| r.year)),
                columns::float64(rows.iter().map(|r| r.duration)),
            ],
        )?)
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let cols = Columns::new(batch, Self::TABLE);
        let song_id = cols.utf8("song_id")?;
        let title = cols.utf8("title")?;
        let artist_id = cols.utf8("artist_id")?;
        let year = cols.int32("year")?;
        let duration = cols.float64("duration")?;

        (0..batch.num_rows())
            .map(|i| {
                Ok(Self {
                    song_id: cols.required(opt_str(song_id, i), "song_id", i)?,
                    title: opt_str(title, i),
                    artist_id: opt_str(artist_id, i),
                    year: opt(year, i),
                    duration: opt(duration, i),
                })
            })
            .collect()
    }
}

// ============================================================================
// artists
// ============================================================================

/// Row of the `artists` dimension
#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub artist_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl TableRow for Artist {
    const TABLE: TableName = TableName::Artists;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("longitude", DataType::Float64, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                columns::utf8(rows.iter().map(|r| Some(r.artist_id.as_str()))),
                columns::utf8(rows.iter().map(|r| r.name.as_deref())),
                columns::utf8(rows.iter().map(|r| r.location.as_deref())),
                columns::float64(rows.iter().map(|r| r.latitude)),
                columns::float64(rows.iter().map(|r| r.longitude)),
            ],
        )?)
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let cols = Columns::new(batch, Self::TABLE);
        let artist_id = cols.utf8("artist_id")?;
        let name = cols.utf8("name")?;
        let location = cols.utf8("location")?;
        let latitude = cols.float64("latitude")?;
        let longitude = cols.float64("longitude")?;

        (0..batch.num_rows())
            .map(|i| {
                Ok(Self {
                    artist_id: cols.required(opt_str(artist_id, i), "artist_id", i)?,
                    name: opt_str(name, i),
                    location: opt_str(location, i),
                    latitude: opt(latitude, i),
                    longitude: opt(longitude, i),
                })
            })
            .collect()
    }
}

// ============================================================================
// users
// ============================================================================

/// Row of the `users` dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

impl TableRow for User {
    const TABLE: TableName = TableName::Users;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("user_id", DataType::Utf8, false),
            Field::new("first_name", DataType::Utf8, true),
            Field::new("last_name", DataType::Utf8, true),
            Field::new("gender", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                columns::utf8(rows.iter().map(|r| Some(r.user_id.as_str()))),
                columns::utf8(rows.iter().map(|r| r.first_name.as_deref())),
                columns::utf8(rows.iter().map(|r| r.last_name.as_deref())),
                columns::utf8(rows.iter().map(|r| r.gender.as_deref())),
                columns::utf8(rows.iter().map(|r| r.level.as_deref())),
            ],
        )?)
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let cols = Columns::new(batch, Self::TABLE);
        let user_id = cols.utf8("user_id")?;
        let first_name = cols.utf8("first_name")?;
        let last_name = cols.utf8("last_name")?;
        let gender = cols.utf8("gender")?;
        let level = cols.utf8("level")?;

        (0..batch.num_rows())
            .map(|i| {
                Ok(Self {
                    user_id: cols.required(opt_str(user_id, i), "user_id", i)?,
                    first_name: opt_str(first_name, i),
                    last_name: opt_str(last_name, i),
                    gender: opt_str(gender, i),
                    level: opt_str(level, i),
                })
            })
            .collect()
    }
}

// ============================================================================
// time
// ============================================================================

/// Row of the `time` dimension
///
/// `week` is the ISO-8601 week of year and `day_of_week` the ISO-8601
/// weekday (Monday = 1 ... Sunday = 7), both in UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    pub start_time: DateTime<Utc>,
    pub year: i32,
    pub month: i32,
    pub week: i32,
    pub day: i32,
    pub hour: i32,
    pub day_of_week: i32,
}

impl TableRow for TimeEntry {
    const TABLE: TableName = TableName::Time;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("start_time", start_time_type(), false),
            Field::new("year", DataType::Int32, false),
            Field::new("month", DataType::Int32, false),
            Field::new("week", DataType::Int32, false),
            Field::new("day", DataType::Int32, false),
            Field::new("hour", DataType::Int32, false),
            Field::new("day_of_week", DataType::Int32, false),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                columns::timestamp(rows.iter().map(|r| Some(r.start_time))),
                columns::int32(rows.iter().map(|r| Some(r.year))),
                columns::int32(rows.iter().map(|r| Some(r.month))),
                columns::int32(rows.iter().map(|r| Some(r.week))),
                columns::int32(rows.iter().map(|r| Some(r.day))),
                columns::int32(rows.iter().map(|r| Some(r.hour))),
                columns::int32(rows.iter().map(|r| Some(r.day_of_week))),
            ],
        )?)
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let cols = Columns::new(batch, Self::TABLE);
        let start_time = cols.timestamp("start_time")?;
        let year = cols.int32("year")?;
        let month = cols.int32("month")?;
        let week = cols.int32("week")?;
        let day = cols.int32("day")?;
        let hour = cols.int32("hour")?;
        let day_of_week = cols.int32("day_of_week")?;

        (0..batch.num_rows())
            .map(|i| {
                Ok(Self {
                    start_time: cols.required(opt_time(start_time, i), "start_time", i)?,
                    year: cols.required(opt(year, i), "year", i)?,
                    month: cols.required(opt(month, i), "month", i)?,
                    week: cols.required(opt(week, i), "week", i)?,
                    day: cols.required(opt(day, i), "day", i)?,
                    hour: cols.required(opt(hour, i), "hour", i)?,
                    day_of_week: cols.required(opt(day_of_week, i), "day_of_week", i)?,
                })
            })
            .collect()
    }
}

// ============================================================================
// songplays
// ============================================================================

/// Row of the `songplays` fact table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongPlay {
    pub songplay_id: i64,
    pub start_time: Option<DateTime<Utc>>,
    pub user_id: Option<String>,
    pub level: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    /// Null when no catalog title matched
    pub song_id: Option<String>,
    /// Null when no catalog title matched
    pub artist_id: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
}

impl TableRow for SongPlay {
    const TABLE: TableName = TableName::Songplays;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("songplay_id", DataType::Int64, false),
            Field::new("start_time", start_time_type(), true),
            Field::new("user_id", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
            Field::new("session_id", DataType::Int64, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("user_agent", DataType::Utf8, true),
            Field::new("song_id", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("year", DataType::Int32, true),
            Field::new("month", DataType::Int32, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                columns::int64(rows.iter().map(|r| Some(r.songplay_id))),
                columns::timestamp(rows.iter().map(|r| r.start_time)),
                columns::utf8(rows.iter().map(|r| r.user_id.as_deref())),
                columns::utf8(rows.iter().map(|r| r.level.as_deref())),
                columns::int64(rows.iter().map(|r| r.session_id)),
                columns::utf8(rows.iter().map(|r| r.location.as_deref())),
                columns::utf8(rows.iter().map(|r| r.user_agent.as_deref())),
                columns::utf8(rows.iter().map(|r| r.song_id.as_deref())),
                columns::utf8(rows.iter().map(|r| r.artist_id.as_deref())),
                columns::int32(rows.iter().map(|r| r.year)),
                columns::int32(rows.iter().map(|r| r.month)),
            ],
        )?)
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let cols = Columns::new(batch, Self::TABLE);
        let songplay_id = cols.int64("songplay_id")?;
        let start_time = cols.timestamp("start_time")?;
        let user_id = cols.utf8("user_id")?;
        let level = cols.utf8("level")?;
        let session_id = cols.int64("session_id")?;
        let location = cols.utf8("location")?;
        let user_agent = cols.utf8("user_agent")?;
        let song_id = cols.utf8("song_id")?;
        let artist_id = cols.utf8("artist_id")?;
        let year = cols.int32("year")?;
        let month = cols.int32("month")?;

        (0..batch.num_rows())
            .map(|i| {
                Ok(Self {
                    songplay_id: cols.required(opt(songplay_id, i), "songplay_id", i)?,
                    start_time: opt_time(start_time, i),
                    user_id: opt_str(user_id, i),
                    level: opt_str(level, i),
                    session_id: opt(session_id, i),
                    location: opt_str(location, i),
                    user_agent: opt_str(user_agent, i),
                    song_id: opt_str(song_id, i),
                    artist_id: opt_str(artist_id, i),
                    year: opt(year, i),
                    month: opt(month, i),
                })
            })
            .collect()
    }
}
