//! Table sink: partitioned Parquet tables under one output root

use super::partition::{parse_segments, restore_partition_columns, split_partitions};
use super::types::{Manifest, WriteSummary, SUCCESS_MARKER};
use super::writer::{decode_parquet, encode_parquet, ParquetWriterConfig};
use crate::error::{Error, Result, ResultExt};
use crate::storage::StorageLocation;
use crate::tables::{table_schema, TableRow};
use crate::types::TableName;
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Maximum number of partition files uploaded at once
const WRITE_CONCURRENCY: usize = 8;

/// Destination for the output tables
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Replace a table with the rows of `batch` (full table schema)
    async fn write_table(&self, table: TableName, batch: RecordBatch) -> Result<WriteSummary>;

    /// Read back the last completed write of a table
    ///
    /// Fails with [`Error::TableNotFound`] when no completed write exists.
    async fn read_table(&self, table: TableName) -> Result<RecordBatch>;
}

/// Write typed rows to their table
pub async fn write_rows<T: TableRow + Sync>(
    sink: &dyn TableSink,
    rows: &[T],
) -> Result<WriteSummary> {
    sink.write_table(T::TABLE, T::to_batch(rows)?).await
}

/// Read a table back as typed rows
pub async fn read_rows<T: TableRow>(sink: &dyn TableSink) -> Result<Vec<T>> {
    let batch = sink.read_table(T::TABLE).await?;
    T::from_batch(&batch)
}

// ============================================================================
// Parquet Sink
// ============================================================================

/// Writes each table as Hive-partitioned Parquet below `<root>/<table>/`
///
/// A write is an overwrite: new files go first, then the `_SUCCESS`
/// manifest, then objects from earlier runs are deleted. Readers only trust
/// the manifest, so a failed write leaves the previous table readable.
pub struct ParquetSink {
    root: StorageLocation,
    writer_config: ParquetWriterConfig,
    run_id: String,
}

impl ParquetSink {
    /// Create a sink rooted at `root`; `run_id` tags every file written
    pub fn new(
        root: StorageLocation,
        writer_config: ParquetWriterConfig,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            root,
            writer_config,
            run_id: run_id.into(),
        }
    }

    /// Output root of this sink
    pub fn root(&self) -> &StorageLocation {
        &self.root
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn file_name(&self) -> String {
        format!("part-00000-{}.parquet", self.run_id)
    }

    async fn read_manifest(&self, table: TableName) -> Result<Manifest> {
        let location = self.root.child(table.as_str());
        let marker = location.path(&[SUCCESS_MARKER]);
        if !location.exists(&marker).await? {
            return Err(Error::table_not_found(table.as_str(), location.url()));
        }
        let body = location.get(&marker).await?;
        serde_json::from_slice(&body)
            .with_context(|| format!("Invalid manifest {}", location.display(&marker)))
    }
}

#[async_trait]
impl TableSink for ParquetSink {
    async fn write_table(&self, table: TableName, batch: RecordBatch) -> Result<WriteSummary> {
        let start = Instant::now();
        let location = self.root.child(table.as_str());
        let rows = batch.num_rows();

        let previous = location.list().await?;

        let file_name = self.file_name();
        let mut uploads = Vec::new();
        for partition in split_partitions(table, &batch)? {
            let mut segments = partition.segments();
            segments.push(file_name.clone());
            let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
            let path = location.path(&refs);
            let data = encode_parquet(&partition.batch, &self.writer_config)?;
            uploads.push((path, data, partition.batch.num_rows()));
        }

        let written: Vec<String> = futures::stream::iter(uploads)
            .map(|(path, data, partition_rows)| {
                let location = &location;
                async move {
                    let url = location.put(&path, data).await?;
                    debug!(table = %table, file = %url, rows = partition_rows, "Wrote partition");
                    location
                        .relative_key(&path)
                        .ok_or_else(|| Error::output(format!("{url} is outside {}", location.url())))
                }
            })
            .buffered(WRITE_CONCURRENCY)
            .try_collect()
            .await?;

        let manifest = Manifest {
            table,
            run_id: self.run_id.clone(),
            rows,
            files: written.clone(),
            completed_at: Utc::now(),
        };
        let marker = location.path(&[SUCCESS_MARKER]);
        location
            .put(&marker, Bytes::from(serde_json::to_vec_pretty(&manifest)?))
            .await?;

        let keep: HashSet<&str> = written.iter().map(String::as_str).collect();
        let mut stale_removed = 0;
        for meta in previous {
            let Some(key) = location.relative_key(&meta.location) else {
                continue;
            };
            if key == SUCCESS_MARKER || keep.contains(key.as_str()) {
                continue;
            }
            location.delete(&meta.location).await?;
            debug!(table = %table, object = %key, "Removed stale object");
            stale_removed += 1;
        }

        info!(
            table = %table,
            rows,
            files = written.len(),
            stale_removed,
            location = %location.url(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Wrote table"
        );

        Ok(WriteSummary {
            table,
            rows,
            files: written.len(),
            stale_removed,
            location: location.url(),
        })
    }

    async fn read_table(&self, table: TableName) -> Result<RecordBatch> {
        let location = self.root.child(table.as_str());
        let manifest = self.read_manifest(table).await?;
        let schema = table_schema(table);

        let mut batches = Vec::with_capacity(manifest.files.len());
        for key in &manifest.files {
            let path = location.path_from_key(key)?;
            let segments = location.relative_segments(&path).unwrap_or_default();
            let file_batch = decode_parquet(location.get(&path).await?)?;
            batches.push(restore_partition_columns(
                table,
                &schema,
                &file_batch,
                &parse_segments(&segments),
            )?);
        }

        let batch = concat_batches(&schema, &batches)?;
        if batch.num_rows() != manifest.rows {
            return Err(Error::schema(
                table.as_str(),
                format!(
                    "read {} rows, manifest of run {} lists {}",
                    batch.num_rows(),
                    manifest.run_id,
                    manifest.rows
                ),
            ));
        }

        debug!(table = %table, rows = batch.num_rows(), files = manifest.files.len(), "Read table");
        Ok(batch)
    }
}
