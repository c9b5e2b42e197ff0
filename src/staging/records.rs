//! Staging record schemas

use super::coerce::{deserialize_f64, deserialize_i32, deserialize_i64, deserialize_utf8};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// `page` value that marks a song play
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// A record type loaded from one input tree
pub trait StagingRecord: DeserializeOwned + Default + Send + 'static {
    /// Directory under the input root holding this record type
    const SOURCE: &'static str;
}

// ============================================================================
// Song Catalog
// ============================================================================

/// One raw song catalog record (`song_data/`)
///
/// Every field is nullable; nothing is unique.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SongRecord {
    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub artist_id: Option<String>,

    #[serde(default, deserialize_with = "deserialize_f64")]
    pub artist_latitude: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_f64")]
    pub artist_longitude: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub artist_location: Option<String>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub artist_name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_f64")]
    pub duration: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_i32")]
    pub num_songs: Option<i32>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub song_id: Option<String>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "deserialize_i32")]
    pub year: Option<i32>,
}

impl StagingRecord for SongRecord {
    const SOURCE: &'static str = "song_data";
}

// ============================================================================
// Listening Events
// ============================================================================

/// One raw listening event (`log_data/`)
///
/// Only the fields below are read; anything else in the log line is ignored.
/// `userId` is text in the logs and is `""` for logged-out sessions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub artist: Option<String>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub auth: Option<String>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub first_name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub gender: Option<String>,

    #[serde(default, deserialize_with = "deserialize_i64")]
    pub item_in_session: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub last_name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_f64")]
    pub length: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub level: Option<String>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub method: Option<String>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub page: Option<String>,

    #[serde(default, deserialize_with = "deserialize_f64")]
    pub registration: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_i64")]
    pub session_id: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub song: Option<String>,

    #[serde(default, deserialize_with = "deserialize_i64")]
    pub status: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_i64")]
    pub ts: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub user_agent: Option<String>,

    #[serde(default, deserialize_with = "deserialize_utf8")]
    pub user_id: Option<String>,
}

impl EventRecord {
    /// Whether this event is a song play
    pub fn is_song_play(&self) -> bool {
        self.page.as_deref() == Some(NEXT_SONG_PAGE)
    }
}

impl StagingRecord for EventRecord {
    const SOURCE: &'static str = "log_data";
}
