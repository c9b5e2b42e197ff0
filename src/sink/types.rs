//! Sink types

use crate::types::TableName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the completion marker written at the root of each table
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Contents of a table's `_SUCCESS` marker
///
/// Readers load exactly the files listed here, so objects left behind by an
/// interrupted run are never read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub table: TableName,
    pub run_id: String,
    pub rows: usize,
    /// Object keys relative to the table directory, as stored
    pub files: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Outcome of one table write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub table: TableName,
    pub rows: usize,
    pub files: usize,
    /// Objects from earlier runs removed after the marker was written
    pub stale_removed: usize,
    pub location: String,
}
