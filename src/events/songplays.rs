use super::TimedEvent;
use crate::catalog::CatalogView;
use crate::source::SongRecord;
use crate::tables::SongplayRow;
use chrono::{Datelike, NaiveDateTime};
use rayon::prelude::*;
use std::collections::HashMap;

/// How a playback's track length is compared to a catalog song duration.
///
/// Names must always match exactly. The default compares durations exactly
/// as well; `duration_tolerance` allows an absolute difference in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JoinPolicy {
    pub duration_tolerance: Option<f64>,
}

impl JoinPolicy {
    pub fn exact() -> Self {
        Self::default()
    }

    pub fn with_tolerance(seconds: f64) -> Self {
        Self {
            duration_tolerance: Some(seconds),
        }
    }

    fn durations_match(&self, length: f64, duration: f64) -> bool {
        match self.duration_tolerance {
            None => length == duration,
            Some(tolerance) => (length - duration).abs() <= tolerance,
        }
    }
}

/// A matched playback before it gets its `songplay_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinedPlay {
    /// Position of the playback in the event input.
    pub event_index: usize,
    pub start_time: NaiveDateTime,
    pub user_id: String,
    pub level: Option<String>,
    pub song_id: String,
    pub artist_id: String,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    pub year: i32,
    pub month: i32,
}

impl JoinedPlay {
    pub fn into_row(self, songplay_id: i64) -> SongplayRow {
        SongplayRow {
            songplay_id,
            start_time: self.start_time,
            user_id: self.user_id,
            level: self.level,
            song_id: self.song_id,
            artist_id: self.artist_id,
            session_id: self.session_id,
            location: self.location,
            user_agent: self.user_agent,
            year: self.year,
            month: self.month,
        }
    }
}

#[derive(Debug, PartialEq)]
struct CatalogSong<'a> {
    song_id: &'a str,
    artist_id: &'a str,
    duration: f64,
}

/// Catalog records keyed by artist name, then song title.
///
/// Records lacking a song id, artist id, name, title or duration can never
/// produce a songplay and are left out. The same song stored more than once
/// is indexed once.
struct CatalogIndex<'a> {
    by_artist: HashMap<&'a str, HashMap<&'a str, Vec<CatalogSong<'a>>>>,
}

impl<'a> CatalogIndex<'a> {
    fn build(records: &'a [SongRecord]) -> Self {
        let mut by_artist: HashMap<&str, HashMap<&str, Vec<CatalogSong>>> = HashMap::new();
        for record in records {
            let (Some(song_id), Some(artist_id), Some(artist_name), Some(title), Some(duration)) = (
                record.song_id.as_deref(),
                record.artist_id.as_deref(),
                record.artist_name.as_deref(),
                record.title.as_deref(),
                record.duration,
            ) else {
                continue;
            };
            let song = CatalogSong {
                song_id,
                artist_id,
                duration,
            };
            let songs = by_artist
                .entry(artist_name)
                .or_default()
                .entry(title)
                .or_default();
            if !songs.contains(&song) {
                songs.push(song);
            }
        }
        Self { by_artist }
    }

    fn candidates(&self, artist: &str, title: &str) -> &[CatalogSong<'a>] {
        self.by_artist
            .get(artist)
            .and_then(|titles| titles.get(title))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every catalog match for one event, in catalog order.
    fn probe(&self, event_index: usize, timed: &TimedEvent, policy: &JoinPolicy) -> Vec<JoinedPlay> {
        let e = &timed.event;
        if !e.is_playback() {
            return Vec::new();
        }
        let (Some(start_time), Some(user_id), Some(artist), Some(song), Some(length)) = (
            timed.start_time,
            e.known_user_id(),
            e.artist.as_deref(),
            e.song.as_deref(),
            e.length,
        ) else {
            return Vec::new();
        };

        self.candidates(artist, song)
            .iter()
            .filter(|candidate| policy.durations_match(length, candidate.duration))
            .map(|candidate| JoinedPlay {
                event_index,
                start_time,
                user_id: user_id.to_string(),
                level: e.level.clone(),
                song_id: candidate.song_id.to_string(),
                artist_id: candidate.artist_id.to_string(),
                session_id: e.session_id,
                location: e.location.clone(),
                user_agent: e.user_agent.clone(),
                year: start_time.year(),
                month: start_time.month() as i32,
            })
            .collect()
    }
}

/// Inner join of playback events with the catalog on
/// `(artist name, song title, duration)`.
///
/// Repeated copies of one catalog song count once, so an event yields one
/// play per distinct matching song and nothing when no song matches. Output
/// keeps event order, then catalog order.
pub fn join_songplays(
    events: &[TimedEvent],
    catalog: &CatalogView,
    policy: &JoinPolicy,
) -> Vec<JoinedPlay> {
    let catalog_index = CatalogIndex::build(catalog.records());
    events
        .par_iter()
        .enumerate()
        .flat_map_iter(|(event_index, timed)| catalog_index.probe(event_index, timed, policy))
        .collect()
}
