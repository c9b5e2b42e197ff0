//! Fact resolution: `songplays`

use super::events::PlayEvent;
use crate::tables::{Song, SongPlay};
use std::collections::HashMap;

// ============================================================================
// Song Catalog
// ============================================================================

/// Ids of one catalog song, as seen by the title join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMatch {
    pub song_id: String,
    pub artist_id: Option<String>,
}

/// The `songs` table indexed by exact title
///
/// Titles are compared byte for byte: no case folding, no trimming. Songs
/// without a title can never match.
#[derive(Debug, Clone, Default)]
pub struct SongCatalog {
    by_title: HashMap<String, Vec<CatalogMatch>>,
    songs: usize,
}

impl SongCatalog {
    /// Index a set of songs (catalog order is kept within a title)
    pub fn from_songs(songs: &[Song]) -> Self {
        let mut by_title: HashMap<String, Vec<CatalogMatch>> = HashMap::new();
        for song in songs {
            if let Some(title) = &song.title {
                by_title.entry(title.clone()).or_default().push(CatalogMatch {
                    song_id: song.song_id.clone(),
                    artist_id: song.artist_id.clone(),
                });
            }
        }
        Self {
            by_title,
            songs: songs.len(),
        }
    }

    /// Every catalog row whose title equals `title`
    pub fn lookup(&self, title: &str) -> &[CatalogMatch] {
        self.by_title.get(title).map_or(&[][..], Vec::as_slice)
    }

    /// Number of songs indexed
    pub fn len(&self) -> usize {
        self.songs
    }

    pub fn is_empty(&self) -> bool {
        self.songs == 0
    }

    /// Titles shared by more than one catalog row
    pub fn ambiguous_titles(&self) -> usize {
        self.by_title.values().filter(|m| m.len() > 1).count()
    }
}

// ============================================================================
// Sequencing
// ============================================================================

/// Decides the order in which plays receive `songplay_id`s
pub trait Sequencer: Send + Sync {
    /// Indices into `plays`, in numbering order; must be a permutation
    fn sequence(&self, plays: &[PlayEvent]) -> Vec<usize>;
}

/// Sorts every play in memory by [`PlayEvent::play_order`]
///
/// This is a barrier over the whole event set and the one step whose memory
/// grows with the full input. Large inputs need an external sort behind the
/// [`Sequencer`] trait instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemorySequencer;

impl Sequencer for InMemorySequencer {
    fn sequence(&self, plays: &[PlayEvent]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..plays.len()).collect();
        order.sort_by(|&a, &b| plays[a].play_order(&plays[b]));
        order
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Number the plays and left-join them to the catalog by title
///
/// `songplay_id`s run 1..=n in sequencer order and are assigned before the
/// join. A play whose title matches several catalog rows appears once per
/// match with the same `songplay_id`; a play with no match keeps null
/// `song_id` and `artist_id`. Output is in `songplay_id` order.
pub fn resolve_songplays(
    plays: &[PlayEvent],
    catalog: &SongCatalog,
    sequencer: &dyn Sequencer,
) -> Vec<SongPlay> {
    let order = sequencer.sequence(plays);
    let mut songplays = Vec::with_capacity(order.len());

    for (rank, &index) in order.iter().enumerate() {
        let play = &plays[index];
        let songplay_id = rank as i64 + 1;
        let matches = play
            .song
            .as_deref()
            .map_or(&[][..], |title| catalog.lookup(title));

        let row = |song_id: Option<String>, artist_id: Option<String>| SongPlay {
            songplay_id,
            start_time: play.start_time,
            user_id: play.user_id.clone(),
            level: play.level.clone(),
            session_id: play.session_id,
            location: play.location.clone(),
            user_agent: play.user_agent.clone(),
            song_id,
            artist_id,
            year: play.year(),
            month: play.month(),
        };

        if matches.is_empty() {
            songplays.push(row(None, None));
        } else {
            songplays.extend(
                matches
                    .iter()
                    .map(|m| row(Some(m.song_id.clone()), m.artist_id.clone())),
            );
        }
    }

    songplays
}
