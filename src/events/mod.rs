//! Event pipeline: log events in, `users`, `time` and `songplays` out.

mod keys;
mod songplays;
mod timestamp;
mod users;

pub use keys::{assign_songplay_ids, SongplayIdStrategy};
pub use songplays::{join_songplays, JoinPolicy, JoinedPlay};
pub use timestamp::{time_row, TimeZoneMode};
pub use users::extract_users;

use crate::catalog::CatalogView;
use crate::output::{persist_rows, PersistReport, TableSink};
use crate::source::{LogEvent, ReadStats, RecordSource};
use crate::tables::{distinct, SongplayRow, TimeRow, UserRow};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use tracing::info;

/// A log event with its derived start time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    pub event: LogEvent,
    pub start_time: Option<NaiveDateTime>,
}

impl TimedEvent {
    pub fn new(event: LogEvent, timezone: TimeZoneMode) -> Self {
        let start_time = event.ts.and_then(|ts| timezone.start_time(ts));
        Self { event, start_time }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventOptions {
    pub timezone: TimeZoneMode,
    pub join: JoinPolicy,
    pub songplay_ids: SongplayIdStrategy,
}

#[derive(Debug, Clone)]
pub struct EventTables {
    pub users: Vec<UserRow>,
    pub time: Vec<TimeRow>,
    pub songplays: Vec<SongplayRow>,
}

/// Keeps only song playback events.
pub fn playback_events(events: Vec<LogEvent>) -> Vec<LogEvent> {
    events.into_par_iter().filter(LogEvent::is_playback).collect()
}

/// Distinct `time` rows over the start times of the events.
pub fn extract_time(events: &[TimedEvent]) -> Vec<TimeRow> {
    let rows: Vec<TimeRow> = events
        .par_iter()
        .filter_map(|e| e.start_time.map(time_row))
        .collect();
    distinct(rows)
}

/// Builds the three event tables from raw log events.
///
/// Non-playback events are dropped before anything else is derived.
pub fn build_event_tables(
    events: Vec<LogEvent>,
    catalog: &CatalogView,
    options: &EventOptions,
) -> EventTables {
    let playback = playback_events(events);
    let users = extract_users(&playback);

    let timed: Vec<TimedEvent> = playback
        .into_par_iter()
        .map(|event| TimedEvent::new(event, options.timezone))
        .collect();
    let time = extract_time(&timed);

    let plays = join_songplays(&timed, catalog, &options.join);
    let songplays = assign_songplay_ids(plays, options.songplay_ids);

    EventTables {
        users,
        time,
        songplays,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EventReport {
    pub read: ReadStats,
    pub users: PersistReport,
    pub time: PersistReport,
    pub songplays: PersistReport,
}

/// Reads the logs, builds the event tables against `catalog` and persists
/// `users`, `time` and `songplays`, in that order.
pub fn run_event_pipeline(
    source: &dyn RecordSource<LogEvent>,
    catalog: &CatalogView,
    sink: &dyn TableSink,
    options: &EventOptions,
) -> Result<EventReport> {
    info!("Reading log data from {}...", source.describe());
    let batch = source
        .load()
        .with_context(|| format!("Failed to read log data from {}", source.describe()))?;

    let total = batch.records.len();
    let tables = build_event_tables(batch.records, catalog, options);
    info!(
        "Extracted {} users, {} time rows and {} songplays from {} events",
        tables.users.len(),
        tables.time.len(),
        tables.songplays.len(),
        total
    );

    let users = persist_rows(sink, &tables.users).context("Failed to write users table")?;
    let time = persist_rows(sink, &tables.time).context("Failed to write time table")?;
    let songplays =
        persist_rows(sink, &tables.songplays).context("Failed to write songplays table")?;

    Ok(EventReport {
        read: batch.stats,
        users,
        time,
        songplays,
    })
}
