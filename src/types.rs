//! Common types used throughout songplay-etl
//!
//! This module contains shared type definitions, type aliases,
//! and small enums used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// Table Names
// ============================================================================

/// The five output tables of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Songs,
    Artists,
    Users,
    Time,
    Songplays,
}

impl TableName {
    /// All tables in the order a run writes them
    pub const ALL: [TableName; 5] = [
        TableName::Songs,
        TableName::Artists,
        TableName::Users,
        TableName::Time,
        TableName::Songplays,
    ];

    /// Directory name under the output root
    pub fn as_str(self) -> &'static str {
        match self {
            TableName::Songs => "songs",
            TableName::Artists => "artists",
            TableName::Users => "users",
            TableName::Time => "time",
            TableName::Songplays => "songplays",
        }
    }

    /// Partition columns, outermost directory first
    pub fn partition_columns(self) -> &'static [&'static str] {
        match self {
            TableName::Songs => &["year", "artist_id"],
            TableName::Artists | TableName::Users => &[],
            TableName::Time | TableName::Songplays => &["year", "month"],
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Compression
// ============================================================================

/// Parquet compression codec selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionCodec {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    None,
}

impl From<CompressionCodec> for parquet::basic::Compression {
    fn from(codec: CompressionCodec) -> Self {
        use parquet::basic::{Compression, GzipLevel, ZstdLevel};
        match codec {
            CompressionCodec::Snappy => Compression::SNAPPY,
            CompressionCodec::Zstd => Compression::ZSTD(ZstdLevel::default()),
            CompressionCodec::Gzip => Compression::GZIP(GzipLevel::default()),
            CompressionCodec::None => Compression::UNCOMPRESSED,
        }
    }
}

impl std::str::FromStr for CompressionCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "snappy" => Ok(Self::Snappy),
            "zstd" => Ok(Self::Zstd),
            "gzip" => Ok(Self::Gzip),
            "none" | "uncompressed" => Ok(Self::None),
            other => Err(format!("unknown compression codec '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        let names: Vec<&str> = TableName::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, ["songs", "artists", "users", "time", "songplays"]);
        assert_eq!(TableName::Time.to_string(), "time");
    }

    #[test]
    fn test_partition_columns() {
        assert_eq!(TableName::Songs.partition_columns(), ["year", "artist_id"]);
        assert!(TableName::Artists.partition_columns().is_empty());
        assert!(TableName::Users.partition_columns().is_empty());
        assert_eq!(TableName::Time.partition_columns(), ["year", "month"]);
        assert_eq!(TableName::Songplays.partition_columns(), ["year", "month"]);
    }

    #[test]
    fn test_compression_codec_parse() {
        assert_eq!("SNAPPY".parse(), Ok(CompressionCodec::Snappy));
        assert_eq!("uncompressed".parse(), Ok(CompressionCodec::None));
        assert!("lz5".parse::<CompressionCodec>().is_err());
    }

    #[test]
    fn test_compression_codec_serde() {
        let codec: CompressionCodec = serde_yaml::from_str("zstd").unwrap();
        assert_eq!(codec, CompressionCodec::Zstd);
    }
}
