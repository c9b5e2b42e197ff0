//! Sink module
//!
//! Persists output tables as Hive-partitioned Parquet and reads them back.
//!
//! # Layout
//!
//! ```text
//! <output_root>/
//!   songs/year=2018/artist_id=AR1/part-00000-<run_id>.parquet
//!   songs/_SUCCESS
//!   artists/part-00000-<run_id>.parquet
//!   artists/_SUCCESS
//!   ...
//! ```
//!
//! Partition columns are encoded in directory names only. A null or empty
//! partition value goes to `__HIVE_DEFAULT_PARTITION__`. The `_SUCCESS`
//! object is a JSON [`Manifest`] listing the files of the completed write.

mod partition;
mod table_sink;
mod types;
mod writer;

pub use partition::{
    parse_segments, restore_partition_columns, split_partitions, Partition, DEFAULT_PARTITION,
};
pub use table_sink::{read_rows, write_rows, ParquetSink, TableSink};
pub use types::{Manifest, WriteSummary, SUCCESS_MARKER};
pub use writer::{decode_parquet, encode_parquet, ParquetWriterConfig};

#[cfg(test)]
mod tests;
