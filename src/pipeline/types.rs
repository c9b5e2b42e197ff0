//! Pipeline report types

use crate::sink::WriteSummary;
use serde::Serialize;

/// Outcome of the `song_data` stage
#[derive(Debug, Clone, Serialize)]
pub struct SongDataReport {
    /// Input objects read
    pub objects: usize,
    /// Staging records, malformed lines included
    pub records: usize,
    pub malformed: usize,
    pub songs: WriteSummary,
    pub artists: WriteSummary,
}

/// Outcome of the `log_data` stage
#[derive(Debug, Clone, Serialize)]
pub struct LogDataReport {
    pub objects: usize,
    pub records: usize,
    pub malformed: usize,
    /// Events dropped by the `NextSong` filter
    pub skipped_events: usize,
    /// Songplay rows with no catalog match
    pub unmatched_plays: usize,
    /// Catalog titles that matched more than one song
    pub ambiguous_titles: usize,
    pub users: WriteSummary,
    pub time: WriteSummary,
    pub songplays: WriteSummary,
}

/// Summary of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub song_data: SongDataReport,
    pub log_data: LogDataReport,
    pub duration_ms: u64,
}

impl RunReport {
    /// Write summaries in the order the tables were written
    pub fn tables(&self) -> [&WriteSummary; 5] {
        [
            &self.song_data.songs,
            &self.song_data.artists,
            &self.log_data.users,
            &self.log_data.time,
            &self.log_data.songplays,
        ]
    }

    /// Rows written across all tables
    pub fn total_rows(&self) -> usize {
        self.tables().iter().map(|t| t.rows).sum()
    }
}
