//! Catalog extraction: `songs` and `artists`

use super::distinct::distinct;
use crate::staging::SongRecord;
use crate::tables::{Artist, Song};

/// The two dimensions derived from the song catalog
#[derive(Debug, Clone, Default)]
pub struct CatalogTables {
    pub songs: Vec<Song>,
    pub artists: Vec<Artist>,
}

/// Derive both catalog dimensions
pub fn extract_catalog(records: &[SongRecord]) -> CatalogTables {
    CatalogTables {
        songs: songs_from_records(records),
        artists: artists_from_records(records),
    }
}

/// `songs`: rows with a song_id, distinct on the full projected row
///
/// Two records with the same song_id but any other differing column (say
/// `duration`) both survive.
pub fn songs_from_records(records: &[SongRecord]) -> Vec<Song> {
    distinct(records.iter().filter_map(|r| {
        Some(Song {
            song_id: r.song_id.clone()?,
            title: r.title.clone(),
            artist_id: r.artist_id.clone(),
            year: r.year,
            duration: r.duration,
        })
    }))
}

/// `artists`: rows with an artist_id, distinct on the full projected row
pub fn artists_from_records(records: &[SongRecord]) -> Vec<Artist> {
    distinct(records.iter().filter_map(|r| {
        Some(Artist {
            artist_id: r.artist_id.clone()?,
            name: r.artist_name.clone(),
            location: r.artist_location.clone(),
            latitude: r.artist_latitude,
            longitude: r.artist_longitude,
        })
    }))
}
