//! Pipeline module
//!
//! Wires the loader, the transforms and the sink into one batch run.
//!
//! # Overview
//!
//! ```text
//! song_data/**.json ──► SongRecord ──► songs, artists ──► sink
//!                                                          │
//!                                            songs read back (SongCatalog)
//!                                                          ▼
//! log_data/**.json ──► EventRecord ──► NextSong ──► users, time, songplays ──► sink
//! ```
//!
//! The `song_data` stage must complete first: the `log_data` stage reads the
//! persisted `songs` table and fails with `TableNotFound` without it.

mod types;

pub use types::{LogDataReport, RunReport, SongDataReport};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::sink::{read_rows, write_rows, ParquetSink, ParquetWriterConfig, TableSink};
use crate::staging::{load_staging, EventRecord, SongRecord};
use crate::storage::StorageLocation;
use crate::tables::Song;
use crate::transform::{
    extract_catalog, extract_events, resolve_songplays, InMemorySequencer, Sequencer, SongCatalog,
};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Default number of input objects fetched at once
const DEFAULT_READ_CONCURRENCY: usize = 16;

/// One configured batch run
pub struct Pipeline {
    /// Input root holding `song_data/` and `log_data/`
    input: StorageLocation,
    /// Output tables
    sink: Arc<dyn TableSink>,
    /// Maximum concurrent object reads
    read_concurrency: usize,
    /// Numbering order for `songplay_id`
    sequencer: Box<dyn Sequencer>,
    run_id: String,
}

impl Pipeline {
    /// Create a pipeline over an input location and a sink
    pub fn new(input: StorageLocation, sink: Arc<dyn TableSink>, run_id: impl Into<String>) -> Self {
        Self {
            input,
            sink,
            read_concurrency: DEFAULT_READ_CONCURRENCY,
            sequencer: Box::new(InMemorySequencer),
            run_id: run_id.into(),
        }
    }

    /// Build the pipeline a config describes
    ///
    /// The input root must exist; a local output root is created if needed.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;

        let input = StorageLocation::parse(config.input_root()?, &config.aws)?;
        let output = StorageLocation::parse_or_create(config.output_root()?, &config.aws)?;
        let run_id = new_run_id();
        let sink = ParquetSink::new(
            output,
            ParquetWriterConfig::from_sink_config(&config.sink),
            run_id.clone(),
        );

        Ok(Self::new(input, Arc::new(sink), run_id).with_read_concurrency(config.read_concurrency))
    }

    /// Set the maximum number of concurrent object reads
    #[must_use]
    pub fn with_read_concurrency(mut self, concurrency: usize) -> Self {
        self.read_concurrency = concurrency.max(1);
        self
    }

    /// Replace the `songplay_id` sequencer
    #[must_use]
    pub fn with_sequencer(mut self, sequencer: impl Sequencer + 'static) -> Self {
        self.sequencer = Box::new(sequencer);
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// The sink tables are written to
    pub fn sink(&self) -> &dyn TableSink {
        self.sink.as_ref()
    }

    /// Run both stages in order
    pub async fn run(&self) -> Result<RunReport> {
        let start = Instant::now();
        info!(run_id = %self.run_id, input = %self.input.url(), "Starting run");

        let song_data = self.process_song_data().await?;
        let log_data = self.process_log_data().await?;

        let report = RunReport {
            run_id: self.run_id.clone(),
            song_data,
            log_data,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        for table in report.tables() {
            info!(table = %table.table, rows = table.rows, files = table.files, location = %table.location, "Table summary");
        }
        info!(
            run_id = %report.run_id,
            total_rows = report.total_rows(),
            duration_ms = report.duration_ms,
            "Run complete"
        );

        Ok(report)
    }

    /// Load `song_data` and write `songs` and `artists`
    pub async fn process_song_data(&self) -> Result<SongDataReport> {
        let staged = load_staging::<SongRecord>(&self.input, self.read_concurrency).await?;
        let tables = extract_catalog(&staged.records);
        info!(
            records = staged.records.len(),
            songs = tables.songs.len(),
            artists = tables.artists.len(),
            "Extracted catalog"
        );

        let songs = write_rows(self.sink(), &tables.songs).await?;
        let artists = write_rows(self.sink(), &tables.artists).await?;

        Ok(SongDataReport {
            objects: staged.objects,
            records: staged.records.len(),
            malformed: staged.malformed,
            songs,
            artists,
        })
    }

    /// Load `log_data` and write `users`, `time` and `songplays`
    ///
    /// The song catalog is read back from the persisted `songs` table before
    /// anything is written.
    pub async fn process_log_data(&self) -> Result<LogDataReport> {
        let songs: Vec<Song> = read_rows(self.sink()).await?;
        let catalog = SongCatalog::from_songs(&songs);
        let ambiguous_titles = catalog.ambiguous_titles();
        if ambiguous_titles > 0 {
            warn!(
                ambiguous_titles,
                "Song titles match several catalog rows; their plays are duplicated"
            );
        }

        let staged = load_staging::<EventRecord>(&self.input, self.read_concurrency).await?;
        let records = staged.records.len();
        let events = extract_events(staged.records);
        info!(
            records,
            plays = events.plays.len(),
            skipped = events.skipped,
            users = events.users.len(),
            "Extracted events"
        );

        let users = write_rows(self.sink(), &events.users).await?;
        let time = write_rows(self.sink(), &events.time).await?;

        let songplays = resolve_songplays(&events.plays, &catalog, self.sequencer.as_ref());
        let unmatched_plays = songplays.iter().filter(|s| s.song_id.is_none()).count();
        info!(
            songplays = songplays.len(),
            catalog = catalog.len(),
            unmatched_plays,
            "Resolved songplays"
        );
        let songplays = write_rows(self.sink(), &songplays).await?;

        Ok(LogDataReport {
            objects: staged.objects,
            records,
            malformed: staged.malformed,
            skipped_events: events.skipped,
            unmatched_plays,
            ambiguous_titles,
            users,
            time,
            songplays,
        })
    }
}

/// Identifier tagging the files of one run, unique within the process
pub fn new_run_id() -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);
    format!(
        "{}-{:x}-{}",
        Utc::now().format("%Y%m%dT%H%M%S%3fZ"),
        std::process::id(),
        SEQUENCE.fetch_add(1, Ordering::Relaxed)
    )
}
