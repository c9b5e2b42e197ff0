//! Tests for sink module

use super::*;
use crate::config::{AwsCredentials, SinkConfig};
use crate::error::Error;
use crate::storage::StorageLocation;
use crate::tables::{Artist, Song, SongPlay, TableRow, TimeEntry};
use crate::types::{CompressionCodec, TableName};
use arrow::array::{Array, Int32Array};
use chrono::{TimeZone, Utc};
use parquet::basic::Compression;
use pretty_assertions::assert_eq;

fn song(id: &str, artist: Option<&str>, year: Option<i32>) -> Song {
    Song {
        song_id: id.to_string(),
        title: Some(format!("Title {id}")),
        artist_id: artist.map(str::to_string),
        year,
        duration: Some(123.25),
    }
}

fn memory_sink(run_id: &str) -> ParquetSink {
    ParquetSink::new(
        StorageLocation::in_memory("lake"),
        ParquetWriterConfig::default(),
        run_id,
    )
}

async fn table_keys(sink: &ParquetSink, table: TableName) -> Vec<String> {
    let location = sink.root().child(table.as_str());
    location
        .list()
        .await
        .unwrap()
        .iter()
        .filter_map(|meta| location.relative_key(&meta.location))
        .collect()
}

fn sorted_songs(mut songs: Vec<Song>) -> Vec<Song> {
    songs.sort_by(|a, b| a.song_id.cmp(&b.song_id));
    songs
}

// ============================================================================
// Writer Tests
// ============================================================================

#[test]
fn test_writer_config_from_sink_config() {
    let config = ParquetWriterConfig::from_sink_config(&SinkConfig {
        compression: CompressionCodec::None,
        row_group_size: 500,
        dictionary: false,
        statistics: false,
    });
    assert_eq!(config.compression(), Compression::UNCOMPRESSED);
    assert_eq!(config.row_group_size(), 500);
    assert!(!config.dictionary_enabled());
    assert!(!config.statistics_enabled());

    let default = ParquetWriterConfig::from_sink_config(&SinkConfig::default());
    assert_eq!(default.compression(), Compression::SNAPPY);
    assert!(default.dictionary_enabled());
    assert!(default.statistics_enabled());
}

#[test]
fn test_encode_decode_keeps_timezone() {
    let rows = vec![TimeEntry {
        start_time: Utc.with_ymd_and_hms(2018, 11, 2, 1, 25, 34).unwrap(),
        year: 2018,
        month: 11,
        week: 44,
        day: 2,
        hour: 1,
        day_of_week: 5,
    }];
    let batch = TimeEntry::to_batch(&rows).unwrap();

    for config in [
        ParquetWriterConfig::default(),
        ParquetWriterConfig::new().with_compression(CompressionCodec::Zstd.into()),
        ParquetWriterConfig::new()
            .with_dictionary(false)
            .with_statistics(false),
    ] {
        let data = encode_parquet(&batch, &config).unwrap();
        let decoded = decode_parquet(data).unwrap();
        assert_eq!(decoded.schema().fields(), batch.schema().fields());
        assert_eq!(TimeEntry::from_batch(&decoded).unwrap(), rows);
    }
}

#[test]
fn test_encode_empty_batch() {
    let batch = Artist::to_batch(&[]).unwrap();
    let data = encode_parquet(&batch, &ParquetWriterConfig::default()).unwrap();
    assert!(!data.is_empty());

    let decoded = decode_parquet(data).unwrap();
    assert_eq!(decoded.num_rows(), 0);
    assert_eq!(decoded.schema().fields(), Artist::schema().fields());
}

// ============================================================================
// Partition Tests
// ============================================================================

#[test]
fn test_split_partitions_groups_rows() {
    let rows = vec![
        song("S1", Some("AR1"), Some(2001)),
        song("S2", Some("AR2"), Some(2001)),
        song("S3", Some("AR1"), Some(2001)),
        song("S4", None, Some(0)),
        song("S5", Some(""), None),
    ];
    let batch = Song::to_batch(&rows).unwrap();
    let partitions = split_partitions(TableName::Songs, &batch).unwrap();

    let segments: Vec<Vec<String>> = partitions.iter().map(Partition::segments).collect();
    assert_eq!(
        segments,
        vec![
            vec!["year=2001".to_string(), "artist_id=AR1".to_string()],
            vec!["year=2001".to_string(), "artist_id=AR2".to_string()],
            vec![
                "year=0".to_string(),
                format!("artist_id={DEFAULT_PARTITION}")
            ],
            vec![
                format!("year={DEFAULT_PARTITION}"),
                format!("artist_id={DEFAULT_PARTITION}")
            ],
        ]
    );

    // Partition columns are stripped from the data
    let first = &partitions[0].batch;
    assert_eq!(first.num_rows(), 2);
    assert!(first.column_by_name("year").is_none());
    assert!(first.column_by_name("artist_id").is_none());
    assert!(first.column_by_name("song_id").is_some());
}

#[test]
fn test_split_unpartitioned_and_empty() {
    let artists = Artist::to_batch(&[Artist {
        artist_id: "AR1".to_string(),
        name: None,
        location: None,
        latitude: None,
        longitude: None,
    }])
    .unwrap();
    let partitions = split_partitions(TableName::Artists, &artists).unwrap();
    assert_eq!(partitions.len(), 1);
    assert!(partitions[0].segments().is_empty());

    let empty = SongPlay::to_batch(&[]).unwrap();
    let partitions = split_partitions(TableName::Songplays, &empty).unwrap();
    assert_eq!(partitions.len(), 1);
    assert!(partitions[0].segments().is_empty());
    assert!(partitions[0].batch.column_by_name("month").is_none());
}

#[test]
fn test_split_requires_partition_columns() {
    let batch = Artist::to_batch(&[]).unwrap();
    let err = split_partitions(TableName::Time, &batch).unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));
    assert!(err.to_string().contains("missing partition column"));
}

#[test]
fn test_restore_partition_columns() {
    let rows = vec![song("S1", Some("AR1"), Some(1999))];
    let batch = Song::to_batch(&rows).unwrap();
    let partition = split_partitions(TableName::Songs, &batch)
        .unwrap()
        .remove(0);

    let values = parse_segments(&partition.segments());
    let restored =
        restore_partition_columns(TableName::Songs, &Song::schema(), &partition.batch, &values)
            .unwrap();
    assert_eq!(Song::from_batch(&restored).unwrap(), rows);

    let year = restored
        .column_by_name("year")
        .unwrap()
        .as_any()
        .downcast_ref::<Int32Array>()
        .unwrap();
    assert_eq!(year.value(0), 1999);
}

#[test]
fn test_restore_rejects_bad_partition_value() {
    let batch = Song::to_batch(&[song("S1", Some("AR1"), Some(1999))]).unwrap();
    let partition = split_partitions(TableName::Songs, &batch)
        .unwrap()
        .remove(0);

    let values = parse_segments(&["year=abc".to_string(), "artist_id=AR1".to_string()]);
    let err =
        restore_partition_columns(TableName::Songs, &Song::schema(), &partition.batch, &values)
            .unwrap_err();
    assert!(err.to_string().contains("year='abc'"));
}

#[test]
fn test_parse_segments_ignores_file_name() {
    let values = parse_segments(&[
        "year=2018".to_string(),
        "month=11".to_string(),
        "part-00000-x.parquet".to_string(),
    ]);
    assert_eq!(values.len(), 2);
    assert_eq!(values["month"], "11");
}

// ============================================================================
// Parquet Sink Tests
// ============================================================================

#[tokio::test]
async fn test_sink_round_trip_songs() {
    let sink = memory_sink("run1");
    let rows = vec![
        song("S1", Some("AR1"), Some(2001)),
        song("S2", Some("AR2"), Some(2001)),
        song("S3", Some("AR1"), Some(2001)),
        song("S4", None, None),
    ];

    let summary = write_rows(&sink, &rows).await.unwrap();
    assert_eq!(summary.table, TableName::Songs);
    assert_eq!(summary.rows, 4);
    assert_eq!(summary.files, 3);
    assert_eq!(summary.stale_removed, 0);

    let read: Vec<Song> = read_rows(&sink).await.unwrap();
    assert_eq!(sorted_songs(read), sorted_songs(rows));
}

#[tokio::test]
async fn test_sink_layout_and_manifest() {
    let sink = memory_sink("run1");
    write_rows(&sink, &[song("S1", Some("AR1"), Some(2001))])
        .await
        .unwrap();

    let keys = table_keys(&sink, TableName::Songs).await;
    assert_eq!(
        keys,
        [
            "_SUCCESS",
            "year=2001/artist_id=AR1/part-00000-run1.parquet"
        ]
    );

    let songs = sink.root().child("songs");
    let body = songs.get(&songs.path(&[SUCCESS_MARKER])).await.unwrap();
    let manifest: Manifest = serde_json::from_slice(&body).unwrap();
    assert_eq!(manifest.table, TableName::Songs);
    assert_eq!(manifest.run_id, "run1");
    assert_eq!(manifest.rows, 1);
    assert_eq!(
        manifest.files,
        ["year=2001/artist_id=AR1/part-00000-run1.parquet"]
    );
}

#[tokio::test]
async fn test_sink_read_missing_table() {
    let sink = memory_sink("run1");
    let err = sink.read_table(TableName::Songs).await.unwrap_err();
    assert!(matches!(err, Error::TableNotFound { .. }));
}

#[tokio::test]
async fn test_sink_files_without_marker_are_not_a_table() {
    let sink = memory_sink("run1");
    let songs = sink.root().child("songs");
    songs
        .put(
            &songs.path(&["year=2001", "part-00000-old.parquet"]),
            bytes::Bytes::from_static(b"partial"),
        )
        .await
        .unwrap();

    let err = read_rows::<Song>(&sink).await.unwrap_err();
    assert!(matches!(err, Error::TableNotFound { .. }));
}

#[tokio::test]
async fn test_sink_overwrite_removes_stale_files() {
    let root = StorageLocation::in_memory("lake");
    let first = ParquetSink::new(root.clone(), ParquetWriterConfig::default(), "run1");
    write_rows(
        &first,
        &[
            song("S1", Some("AR1"), Some(2001)),
            song("S2", Some("AR2"), Some(2002)),
        ],
    )
    .await
    .unwrap();

    let second = ParquetSink::new(root, ParquetWriterConfig::default(), "run2");
    let rows = vec![song("S9", Some("AR9"), Some(2009))];
    let summary = write_rows(&second, &rows).await.unwrap();
    assert_eq!(summary.stale_removed, 2);

    assert_eq!(
        table_keys(&second, TableName::Songs).await,
        [
            "_SUCCESS",
            "year=2009/artist_id=AR9/part-00000-run2.parquet"
        ]
    );
    assert_eq!(read_rows::<Song>(&first).await.unwrap(), rows);
}

#[tokio::test]
async fn test_sink_empty_table_writes_schema_file() {
    let sink = memory_sink("run1");
    let summary = write_rows::<SongPlay>(&sink, &[]).await.unwrap();
    assert_eq!(summary.rows, 0);
    assert_eq!(summary.files, 1);

    assert_eq!(
        table_keys(&sink, TableName::Songplays).await,
        ["_SUCCESS", "part-00000-run1.parquet"]
    );

    let batch = sink.read_table(TableName::Songplays).await.unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.schema(), SongPlay::schema());
}

#[tokio::test]
async fn test_sink_partition_value_with_special_characters() {
    let sink = memory_sink("run1");
    let rows = vec![song("S1", Some("AR/1 x=y"), Some(2001))];
    write_rows(&sink, &rows).await.unwrap();

    assert_eq!(read_rows::<Song>(&sink).await.unwrap(), rows);
}

#[tokio::test]
async fn test_sink_local_filesystem() {
    let temp_dir = tempfile::tempdir().unwrap();
    let out = temp_dir.path().join("lake");
    let root =
        StorageLocation::parse_or_create(out.to_str().unwrap(), &AwsCredentials::default())
            .unwrap();
    let sink = ParquetSink::new(root, ParquetWriterConfig::default(), "run1");

    let rows = vec![
        SongPlay {
            songplay_id: 1,
            start_time: Some(Utc.with_ymd_and_hms(2018, 11, 2, 1, 25, 34).unwrap()),
            user_id: Some("8".to_string()),
            level: Some("free".to_string()),
            session_id: Some(139),
            location: Some("Phoenix-Mesa-Scottsdale, AZ".to_string()),
            user_agent: None,
            song_id: None,
            artist_id: None,
            year: Some(2018),
            month: Some(11),
        },
        SongPlay {
            songplay_id: 2,
            start_time: None,
            user_id: None,
            level: None,
            session_id: None,
            location: None,
            user_agent: None,
            song_id: None,
            artist_id: None,
            year: None,
            month: None,
        },
    ];
    write_rows(&sink, &rows).await.unwrap();

    assert!(out.join("songplays").join("_SUCCESS").is_file());
    assert!(out
        .join("songplays")
        .join("year=2018")
        .join("month=11")
        .join("part-00000-run1.parquet")
        .is_file());

    let mut read: Vec<SongPlay> = read_rows(&sink).await.unwrap();
    read.sort_by_key(|r| r.songplay_id);
    assert_eq!(read, rows);
}
