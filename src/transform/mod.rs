//! Transform module
//!
//! The pure part of the pipeline: staging records in, table rows out.
//!
//! # Overview
//!
//! - [`extract_catalog`] - `songs` and `artists` from song records
//! - [`extract_events`] - `NextSong` filter, calendar fields, `users`, `time`
//! - [`resolve_songplays`] - surrogate keys and the title join for `songplays`
//!
//! Nothing here touches storage; the pipeline module wires these functions
//! to the loader and the sink.

pub mod calendar;
mod catalog;
mod distinct;
mod events;
mod facts;

pub use calendar::CalendarFields;
pub use catalog::{artists_from_records, extract_catalog, songs_from_records, CatalogTables};
pub use distinct::{distinct, RowKey};
pub use events::{
    extract_events, filter_plays, time_from_plays, users_from_plays, EventTables, PlayEvent,
};
pub use facts::{resolve_songplays, CatalogMatch, InMemorySequencer, Sequencer, SongCatalog};
