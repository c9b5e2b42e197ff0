//! Hive-style partitioning
//!
//! Partition columns live only in directory names (`year=2018/month=11`).
//! Writing strips them from the rows; reading puts them back from the path.

use crate::error::{Error, Result};
use crate::types::TableName;
use arrow::array::{new_null_array, Array, ArrayRef, StringArray, UInt32Array};
use arrow::compute::{cast, take_record_batch};
use arrow::datatypes::{Field, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use std::collections::HashMap;
use std::sync::Arc;

/// Directory value for a null or empty partition value
pub const DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// Rows that share one partition directory
#[derive(Debug, Clone)]
pub struct Partition {
    /// `(column, directory value)` pairs, outermost first
    pub values: Vec<(String, String)>,
    /// The rows, partition columns removed
    pub batch: RecordBatch,
}

impl Partition {
    /// Directory segments, e.g. `["year=2018", "month=11"]`
    pub fn segments(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|(column, value)| format!("{column}={value}"))
            .collect()
    }
}

/// Split a full-schema batch into one batch per partition directory
///
/// Partitions come out in order of first appearance and keep their rows in
/// input order. An unpartitioned table, or an empty batch, yields a single
/// partition with no directory segments.
pub fn split_partitions(table: TableName, batch: &RecordBatch) -> Result<Vec<Partition>> {
    let columns = table.partition_columns();
    let schema = batch.schema();

    let key_indices = columns
        .iter()
        .map(|column| {
            schema.index_of(column).map_err(|_| {
                Error::schema(
                    table.as_str(),
                    format!("missing partition column '{column}'"),
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let data_indices: Vec<usize> = (0..schema.fields().len())
        .filter(|i| !key_indices.contains(i))
        .collect();
    let data = batch.project(&data_indices)?;

    if key_indices.is_empty() || batch.num_rows() == 0 {
        return Ok(vec![Partition {
            values: Vec::new(),
            batch: data,
        }]);
    }

    let mut slots: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<(Vec<String>, Vec<u32>)> = Vec::new();
    for row in 0..batch.num_rows() {
        let key = key_indices
            .iter()
            .map(|&i| directory_value(batch.column(i), row))
            .collect::<Result<Vec<_>>>()?;
        let slot = match slots.get(&key) {
            Some(&slot) => slot,
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push((key, Vec::new()));
                groups.len() - 1
            }
        };
        groups[slot].1.push(row as u32);
    }

    groups
        .into_iter()
        .map(|(key, rows)| {
            let indices = UInt32Array::from(rows);
            Ok(Partition {
                values: columns.iter().map(|c| (*c).to_string()).zip(key).collect(),
                batch: take_record_batch(&data, &indices)?,
            })
        })
        .collect()
}

fn directory_value(array: &ArrayRef, row: usize) -> Result<String> {
    if array.is_null(row) {
        return Ok(DEFAULT_PARTITION.to_string());
    }
    let value = array_value_to_string(array, row)?;
    if value.is_empty() {
        Ok(DEFAULT_PARTITION.to_string())
    } else {
        Ok(value)
    }
}

/// Partition values from the directory segments of an object key
///
/// Segments without `=` (the file name) are ignored.
pub fn parse_segments(segments: &[String]) -> HashMap<String, String> {
    segments
        .iter()
        .filter_map(|segment| segment.split_once('='))
        .map(|(column, value)| (column.to_string(), value.to_string()))
        .collect()
}

/// Rebuild a full-schema batch from one file's rows and its partition values
pub fn restore_partition_columns(
    table: TableName,
    schema: &SchemaRef,
    file_batch: &RecordBatch,
    values: &HashMap<String, String>,
) -> Result<RecordBatch> {
    let rows = file_batch.num_rows();
    let partition_columns = table.partition_columns();

    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let name = field.name();
            if partition_columns.contains(&name.as_str()) {
                partition_array(table, field, values.get(name), rows)
            } else {
                file_batch.column_by_name(name).cloned().ok_or_else(|| {
                    Error::schema(table.as_str(), format!("file is missing column '{name}'"))
                })
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RecordBatch::try_new(Arc::clone(schema), columns)?)
}

fn partition_array(
    table: TableName,
    field: &Field,
    value: Option<&String>,
    rows: usize,
) -> Result<ArrayRef> {
    match value.map(String::as_str) {
        Some(DEFAULT_PARTITION) => Ok(new_null_array(field.data_type(), rows)),
        Some(text) => {
            let raw: ArrayRef = Arc::new(StringArray::from(vec![text; rows]));
            let typed = cast(&raw, field.data_type())?;
            if typed.null_count() > 0 {
                return Err(Error::schema(
                    table.as_str(),
                    format!(
                        "partition value {}='{text}' is not a valid {}",
                        field.name(),
                        field.data_type()
                    ),
                ));
            }
            Ok(typed)
        }
        None if rows == 0 => Ok(new_null_array(field.data_type(), 0)),
        None => Err(Error::schema(
            table.as_str(),
            format!("no partition value for '{}'", field.name()),
        )),
    }
}
