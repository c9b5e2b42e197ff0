//! Column builders and typed column access

use crate::error::{Error, Result};
use crate::types::TableName;
use arrow::array::{
    Array, ArrayRef, ArrowPrimitiveType, Float64Array, Int32Array, Int64Array, PrimitiveArray,
    StringArray, TimestampMillisecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use std::sync::Arc;

const UTC: &str = "UTC";

/// Arrow type of every `start_time` column
pub fn start_time_type() -> DataType {
    DataType::Timestamp(TimeUnit::Millisecond, Some(UTC.into()))
}

/// Display form of a start time (`YYYY-MM-DD HH:MM:SS`, UTC)
pub fn format_start_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ============================================================================
// Builders
// ============================================================================

pub(crate) fn utf8<'a>(values: impl Iterator<Item = Option<&'a str>>) -> ArrayRef {
    Arc::new(values.collect::<StringArray>())
}

pub(crate) fn int32(values: impl Iterator<Item = Option<i32>>) -> ArrayRef {
    Arc::new(values.collect::<Int32Array>())
}

pub(crate) fn int64(values: impl Iterator<Item = Option<i64>>) -> ArrayRef {
    Arc::new(values.collect::<Int64Array>())
}

pub(crate) fn float64(values: impl Iterator<Item = Option<f64>>) -> ArrayRef {
    Arc::new(values.collect::<Float64Array>())
}

pub(crate) fn timestamp(values: impl Iterator<Item = Option<DateTime<Utc>>>) -> ArrayRef {
    let millis: TimestampMillisecondArray =
        values.map(|v| v.map(|t| t.timestamp_millis())).collect();
    Arc::new(millis.with_timezone(UTC))
}

// ============================================================================
// Readers
// ============================================================================

/// Typed, named access to the columns of one batch
pub(crate) struct Columns<'a> {
    batch: &'a RecordBatch,
    table: TableName,
}

impl<'a> Columns<'a> {
    pub(crate) fn new(batch: &'a RecordBatch, table: TableName) -> Self {
        Self { batch, table }
    }

    fn typed<A: Array + 'static>(&self, name: &str, expected: &str) -> Result<&'a A> {
        let column = self
            .batch
            .column_by_name(name)
            .ok_or_else(|| Error::schema(self.table.as_str(), format!("missing column '{name}'")))?;
        column.as_any().downcast_ref::<A>().ok_or_else(|| {
            Error::schema(
                self.table.as_str(),
                format!(
                    "column '{name}' is {}, expected {expected}",
                    column.data_type()
                ),
            )
        })
    }

    pub(crate) fn utf8(&self, name: &str) -> Result<&'a StringArray> {
        self.typed(name, "Utf8")
    }

    pub(crate) fn int32(&self, name: &str) -> Result<&'a Int32Array> {
        self.typed(name, "Int32")
    }

    pub(crate) fn int64(&self, name: &str) -> Result<&'a Int64Array> {
        self.typed(name, "Int64")
    }

    pub(crate) fn float64(&self, name: &str) -> Result<&'a Float64Array> {
        self.typed(name, "Float64")
    }

    pub(crate) fn timestamp(&self, name: &str) -> Result<&'a TimestampMillisecondArray> {
        self.typed(name, "Timestamp(Millisecond)")
    }

    /// A value that must not be null
    pub(crate) fn required<T>(&self, value: Option<T>, column: &str, row: usize) -> Result<T> {
        value.ok_or_else(|| {
            Error::schema(
                self.table.as_str(),
                format!("null in non-null column '{column}' at row {row}"),
            )
        })
    }
}

pub(crate) fn opt_str(array: &StringArray, row: usize) -> Option<String> {
    array.is_valid(row).then(|| array.value(row).to_string())
}

pub(crate) fn opt<T: ArrowPrimitiveType>(
    array: &PrimitiveArray<T>,
    row: usize,
) -> Option<T::Native> {
    array.is_valid(row).then(|| array.value(row))
}

pub(crate) fn opt_time(array: &TimestampMillisecondArray, row: usize) -> Option<DateTime<Utc>> {
    opt(array, row).and_then(DateTime::from_timestamp_millis)
}
