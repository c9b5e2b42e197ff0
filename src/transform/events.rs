//! Event extraction: the `NextSong` filter, `users` and `time`

use super::calendar::{start_time_from_millis, CalendarFields};
use crate::staging::EventRecord;
use crate::tables::{TimeEntry, User};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A song-play event with its derived time columns
#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    /// Position of the source record in the staging input
    pub ordinal: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub calendar: Option<CalendarFields>,
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    /// Song title as logged by the player
    pub song: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl PlayEvent {
    /// Build from a staging record at `ordinal`
    pub fn from_record(ordinal: usize, record: EventRecord) -> Self {
        let start_time = record.ts.and_then(start_time_from_millis);
        Self {
            ordinal,
            start_time,
            calendar: start_time.as_ref().map(CalendarFields::from_time),
            user_id: record.user_id,
            first_name: record.first_name,
            last_name: record.last_name,
            gender: record.gender,
            level: record.level,
            song: record.song,
            session_id: record.session_id,
            location: record.location,
            user_agent: record.user_agent,
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.calendar.map(|c| c.year)
    }

    pub fn month(&self) -> Option<i32> {
        self.calendar.map(|c| c.month)
    }

    /// Total order over plays: start_time ascending (missing first), then
    /// input position
    pub fn play_order(&self, other: &Self) -> Ordering {
        self.start_time
            .cmp(&other.start_time)
            .then(self.ordinal.cmp(&other.ordinal))
    }
}

/// Derived event tables plus the filtered plays the fact table is built from
#[derive(Debug, Clone, Default)]
pub struct EventTables {
    pub plays: Vec<PlayEvent>,
    pub users: Vec<User>,
    pub time: Vec<TimeEntry>,
    /// Staging records dropped by the `NextSong` filter
    pub skipped: usize,
}

/// Filter to song plays and derive `users` and `time`
pub fn extract_events(records: Vec<EventRecord>) -> EventTables {
    let total = records.len();
    let plays = filter_plays(records);
    let users = users_from_plays(&plays);
    let time = time_from_plays(&plays);

    EventTables {
        skipped: total - plays.len(),
        plays,
        users,
        time,
    }
}

/// Keep only `page == "NextSong"` records, in input order
pub fn filter_plays(records: Vec<EventRecord>) -> Vec<PlayEvent> {
    records
        .into_iter()
        .enumerate()
        .filter(|(_, record)| record.is_song_play())
        .map(|(ordinal, record)| PlayEvent::from_record(ordinal, record))
        .collect()
}

/// `users`: one row per non-null user_id
///
/// A user whose attributes differ between plays (typically `level` after an
/// upgrade) keeps the snapshot of their latest play. Exact duplicate rows
/// collapse the same way. Rows come out in order of each user's first play.
pub fn users_from_plays(plays: &[PlayEvent]) -> Vec<User> {
    let mut ordered: Vec<&PlayEvent> = plays.iter().filter(|p| p.user_id.is_some()).collect();
    ordered.sort_by(|a, b| a.play_order(b));

    let mut latest: HashMap<&str, &PlayEvent> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for play in ordered {
        let Some(user_id) = play.user_id.as_deref() else {
            continue;
        };
        if latest.insert(user_id, play).is_none() {
            first_seen.push(user_id);
        }
    }

    first_seen
        .into_iter()
        .filter_map(|user_id| latest.get(user_id))
        .map(|play| User {
            user_id: play.user_id.clone().unwrap_or_default(),
            first_name: play.first_name.clone(),
            last_name: play.last_name.clone(),
            gender: play.gender.clone(),
            level: play.level.clone(),
        })
        .collect()
}

/// `time`: one row per play with a start time, duplicates kept
pub fn time_from_plays(plays: &[PlayEvent]) -> Vec<TimeEntry> {
    plays
        .iter()
        .filter_map(|play| {
            let start_time = play.start_time?;
            let c = play.calendar?;
            Some(TimeEntry {
                start_time,
                year: c.year,
                month: c.month,
                week: c.week,
                day: c.day,
                hour: c.hour,
                day_of_week: c.day_of_week,
            })
        })
        .collect()
}
