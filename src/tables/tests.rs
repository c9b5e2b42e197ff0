//! Tests for tables module

use super::*;
use crate::error::Error;
use arrow::array::{Array, Int32Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn song(id: &str, year: Option<i32>) -> Song {
    Song {
        song_id: id.to_string(),
        title: Some(format!("Title {id}")),
        artist_id: Some("AR1".to_string()),
        year,
        duration: Some(200.5),
    }
}

// ============================================================================
// Schema Tests
// ============================================================================

#[test]
fn test_schemas_include_partition_columns() {
    for (schema, table) in [
        (Song::schema(), Song::TABLE),
        (TimeEntry::schema(), TimeEntry::TABLE),
        (SongPlay::schema(), SongPlay::TABLE),
    ] {
        for column in table.partition_columns() {
            assert!(schema.field_with_name(column).is_ok(), "{table}.{column}");
        }
    }
}

#[test]
fn test_table_schema_lookup() {
    use crate::types::TableName;
    assert_eq!(table_schema(TableName::Songs), Song::schema());
    assert_eq!(table_schema(TableName::Users), User::schema());
    assert_eq!(table_schema(TableName::Songplays), SongPlay::schema());
}

#[test]
fn test_songplay_schema_order() {
    let names: Vec<String> = SongPlay::schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert_eq!(
        names,
        [
            "songplay_id",
            "start_time",
            "user_id",
            "level",
            "session_id",
            "location",
            "user_agent",
            "song_id",
            "artist_id",
            "year",
            "month"
        ]
    );
}

#[test]
fn test_start_time_type() {
    assert_eq!(
        start_time_type(),
        DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()))
    );
    let t = Utc.with_ymd_and_hms(2018, 11, 2, 1, 25, 34).unwrap();
    assert_eq!(format_start_time(&t), "2018-11-02 01:25:34");
}

// ============================================================================
// Batch Conversion Tests
// ============================================================================

#[test]
fn test_song_batch_columns() {
    let rows = vec![song("S1", Some(2001)), song("S2", None)];
    let batch = Song::to_batch(&rows).unwrap();

    assert_eq!(batch.num_rows(), 2);
    let year = batch
        .column_by_name("year")
        .unwrap()
        .as_any()
        .downcast_ref::<Int32Array>()
        .unwrap();
    assert_eq!(year.value(0), 2001);
    assert!(year.is_null(1));

    assert_eq!(Song::from_batch(&batch).unwrap(), rows);
}

#[test]
fn test_time_entry_batch_keeps_timezone() {
    let start_time = Utc.with_ymd_and_hms(2018, 11, 2, 1, 25, 34).unwrap();
    let rows = vec![TimeEntry {
        start_time,
        year: 2018,
        month: 11,
        week: 44,
        day: 2,
        hour: 1,
        day_of_week: 5,
    }];
    let batch = TimeEntry::to_batch(&rows).unwrap();

    let column = batch.column_by_name("start_time").unwrap();
    assert_eq!(column.data_type(), &start_time_type());
    let millis = column
        .as_any()
        .downcast_ref::<TimestampMillisecondArray>()
        .unwrap();
    assert_eq!(millis.value(0), 1_541_121_934_000);

    assert_eq!(TimeEntry::from_batch(&batch).unwrap(), rows);
}

#[test]
fn test_songplay_batch_nullable_keys() {
    let rows = vec![SongPlay {
        songplay_id: 1,
        start_time: None,
        user_id: Some("8".to_string()),
        level: Some("free".to_string()),
        session_id: Some(139),
        location: None,
        user_agent: None,
        song_id: None,
        artist_id: None,
        year: None,
        month: None,
    }];
    let batch = SongPlay::to_batch(&rows).unwrap();
    assert_eq!(batch.column_by_name("song_id").unwrap().null_count(), 1);
    assert_eq!(SongPlay::from_batch(&batch).unwrap(), rows);
}

#[test]
fn test_empty_batch() {
    let batch = User::to_batch(&[]).unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.schema(), User::schema());
    assert!(User::from_batch(&batch).unwrap().is_empty());
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_from_batch_missing_column() {
    let schema = Arc::new(Schema::new(vec![Field::new("user_id", DataType::Utf8, false)]));
    let batch =
        RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(vec!["U1"]))]).unwrap();

    let err = User::from_batch(&batch).unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));
    assert!(err.to_string().contains("missing column 'first_name'"));
}

#[test]
fn test_from_batch_wrong_type() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("artist_id", DataType::Utf8, false),
        Field::new("name", DataType::Int32, true),
        Field::new("location", DataType::Utf8, true),
        Field::new("latitude", DataType::Float64, true),
        Field::new("longitude", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec!["AR1"])),
            Arc::new(Int32Array::from(vec![1])),
            Arc::new(StringArray::from(vec![None::<&str>])),
            Arc::new(arrow::array::Float64Array::from(vec![None])),
            Arc::new(arrow::array::Float64Array::from(vec![None])),
        ],
    )
    .unwrap();

    let err = Artist::from_batch(&batch).unwrap_err();
    assert!(err.to_string().contains("column 'name' is Int32, expected Utf8"));
}

#[test]
fn test_from_batch_null_in_required_column() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("song_id", DataType::Utf8, true),
        Field::new("title", DataType::Utf8, true),
        Field::new("artist_id", DataType::Utf8, true),
        Field::new("year", DataType::Int32, true),
        Field::new("duration", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec![None::<&str>])),
            Arc::new(StringArray::from(vec![Some("t")])),
            Arc::new(StringArray::from(vec![Some("a")])),
            Arc::new(Int32Array::from(vec![Some(1)])),
            Arc::new(arrow::array::Float64Array::from(vec![Some(1.0)])),
        ],
    )
    .unwrap();

    let err = Song::from_batch(&batch).unwrap_err();
    assert!(err.to_string().contains("null in non-null column 'song_id'"));
}
