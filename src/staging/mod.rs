//! Staging module
//!
//! Loads raw newline-delimited JSON from the input root into typed staging
//! records.
//!
//! # Overview
//!
//! Both inputs are read against an explicit schema:
//! - `song_data/` → [`SongRecord`]
//! - `log_data/` → [`EventRecord`]
//!
//! Fields whose JSON type does not match the declared type become null
//! instead of failing the record (see [`coerce`]). Lines that are not JSON
//! objects become all-null records and are counted as malformed.

pub mod coerce;
mod decoder;
mod loader;
mod records;

pub use decoder::{decode_jsonl, DecodedObject};
pub use loader::{load_staging, Staged};
pub use records::{EventRecord, SongRecord, StagingRecord, NEXT_SONG_PAGE};
