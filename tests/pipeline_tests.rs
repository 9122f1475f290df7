//! End-to-end tests of the table derivations over on-disk source trees.

mod common;

use common::*;
use songplay_warehouse::catalog::{build_catalog_tables, CatalogTables, CatalogView};
use songplay_warehouse::events::{
    build_event_tables, EventOptions, EventTables, SongplayIdStrategy, TimeZoneMode,
};
use songplay_warehouse::output::MemorySink;
use songplay_warehouse::run_batch;
use songplay_warehouse::source::{
    log_source, song_source, LogEvent, MemorySource, RecordSource, SongRecord,
};
use std::collections::HashSet;
use std::hash::Hash;

fn utc_options() -> EventOptions {
    EventOptions {
        timezone: TimeZoneMode::Utc,
        ..Default::default()
    }
}

fn build_all(dataset: &TestDataset, options: &EventOptions) -> (CatalogTables, EventTables) {
    let songs = song_source(&dataset.input_path()).unwrap();
    let logs = log_source(&dataset.input_path()).unwrap();
    let song_records = RecordSource::<SongRecord>::load(&songs).unwrap().records;
    let log_records = RecordSource::<LogEvent>::load(&logs).unwrap().records;

    let catalog = build_catalog_tables(&song_records);
    let events = build_event_tables(log_records, &CatalogView::new(song_records), options);
    (catalog, events)
}

fn assert_unique<T, K: Eq + Hash>(rows: &[T], key: impl Fn(&T) -> K) {
    let keys: HashSet<K> = rows.iter().map(key).collect();
    assert_eq!(keys.len(), rows.len(), "duplicate keys");
}

fn as_set<T: Clone + Eq + Hash>(rows: &[T]) -> HashSet<T> {
    rows.iter().cloned().collect()
}

#[test]
fn test_single_matching_play_yields_one_songplay() {
    let songs = MemorySource::new(vec![SongRecord {
        song_id: Some("S1".into()),
        title: Some("X".into()),
        artist_id: Some("A1".into()),
        artist_name: Some("Art".into()),
        duration: Some(200.0),
        year: Some(2000),
        ..Default::default()
    }]);
    let logs: MemorySource<LogEvent> = MemorySource::new(vec![serde_json::from_str(
        r#"{"page":"NextSong","song":"X","artist":"Art","length":200.0,"userId":"7","ts":1000000000000}"#,
    )
    .unwrap()]);
    let sink = MemorySink::new();

    let summary = run_batch(&songs, &logs, &sink, &utc_options()).unwrap();

    assert_eq!(summary.events.songplays.rows, 1);
    let partitions = sink.table("songplays").unwrap();
    assert_eq!(partitions.len(), 1);
    let batch = &partitions[0].batch;
    assert_eq!(string_column(batch, "song_id"), vec![Some("S1".to_string())]);
    assert_eq!(string_column(batch, "artist_id"), vec![Some("A1".to_string())]);
    assert_eq!(string_column(batch, "user_id"), vec![Some("7".to_string())]);
    assert_eq!(i64_column(batch, "songplay_id"), vec![1]);
    assert_eq!(
        timestamp_column(batch, "start_time")[0].to_string(),
        "2001-09-09 01:46:40"
    );
}

#[test]
fn test_sample_dataset_table_sizes() {
    let dataset = create_sample_dataset().unwrap();
    let (catalog, events) = build_all(&dataset, &utc_options());

    assert_eq!(catalog.songs.len(), 2);
    assert_eq!(catalog.artists.len(), 2);
    assert_eq!(events.users.len(), 3);
    // Every playback second counts, matched or not, anonymous or not.
    assert_eq!(events.time.len(), 5);
    assert_eq!(events.songplays.len(), MATCHED_PLAYS);
}

#[test]
fn test_dimension_keys_are_unique_and_present() {
    let dataset = create_sample_dataset().unwrap();
    let (catalog, events) = build_all(&dataset, &utc_options());

    assert_unique(&catalog.songs, |r| r.song_id.clone());
    assert_unique(&catalog.artists, |r| r.artist_id.clone());
    assert_unique(&events.users, |r| r.user_id.clone());
    assert_unique(&events.time, |r| r.start_time);

    assert!(catalog.songs.iter().all(|r| !r.song_id.is_empty()));
    assert!(catalog.artists.iter().all(|r| !r.artist_id.is_empty()));
    assert!(events.users.iter().all(|r| !r.user_id.is_empty()));
    assert!(events
        .songplays
        .iter()
        .all(|r| !r.song_id.is_empty() && !r.artist_id.is_empty()));
}

#[test]
fn test_user_level_comes_from_latest_event() {
    let dataset = create_sample_dataset().unwrap();
    let (_, events) = build_all(&dataset, &utc_options());

    let upgrading: Vec<_> = events
        .users
        .iter()
        .filter(|u| u.user_id == USER_UPGRADING)
        .collect();
    assert_eq!(upgrading.len(), 1);
    assert_eq!(upgrading[0].level.as_deref(), Some("paid"));
    assert_eq!(upgrading[0].first_name.as_deref(), Some("First26"));
}

#[test]
fn test_non_playback_events_are_ignored() {
    let dataset = create_sample_dataset().unwrap();
    let (_, events) = build_all(&dataset, &utc_options());

    assert!(events.users.iter().all(|u| u.user_id != USER_BROWSING));
    assert!(events.songplays.iter().all(|p| p.user_id != USER_BROWSING));
    let home_page_visit = TimeZoneMode::Utc
        .start_time(TS_FIRST_PLAY - 60_000)
        .unwrap();
    assert!(events.time.iter().all(|t| t.start_time != home_page_visit));
}

#[test]
fn test_songplays_match_catalog_ids() {
    let dataset = create_sample_dataset().unwrap();
    let (_, events) = build_all(&dataset, &utc_options());

    let mut plays: Vec<(String, String, String, String)> = events
        .songplays
        .iter()
        .map(|p| {
            (
                p.user_id.clone(),
                p.start_time.to_string(),
                p.song_id.clone(),
                p.artist_id.clone(),
            )
        })
        .collect();
    plays.sort();
    assert_eq!(
        plays,
        vec![
            (
                USER_UPGRADING.to_string(),
                "2018-11-01 20:57:10".to_string(),
                SONG_1_ID.to_string(),
                ARTIST_1_ID.to_string()
            ),
            (
                USER_UPGRADING.to_string(),
                "2018-11-01 21:01:46".to_string(),
                SONG_2_ID.to_string(),
                ARTIST_2_ID.to_string()
            ),
            (
                USER_SECOND_DAY.to_string(),
                "2018-11-02 20:20:00".to_string(),
                SONG_1_ID.to_string(),
                ARTIST_1_ID.to_string()
            ),
        ]
    );
    assert!(events.songplays.iter().all(|p| p.user_id != USER_UNMATCHED));
    assert!(events
        .songplays
        .iter()
        .all(|p| p.year == 2018 && p.month == 11));
}

#[test]
fn test_repeated_catalog_records_match_once() {
    let dataset = create_sample_dataset().unwrap();
    let songs = song_source(&dataset.input_path()).unwrap();
    let song_records = RecordSource::<SongRecord>::load(&songs).unwrap().records;
    let song_1_copies = song_records
        .iter()
        .filter(|r| r.song_id.as_deref() == Some(SONG_1_ID))
        .count();
    assert_eq!(song_1_copies, 2);

    let (_, events) = build_all(&dataset, &utc_options());

    let song_1_plays = events
        .songplays
        .iter()
        .filter(|p| p.song_id == SONG_1_ID)
        .count();
    assert_eq!(song_1_plays, 2);
    assert_unique(&events.songplays, |p| (p.user_id.clone(), p.start_time));
}

#[test]
fn test_songplay_ids_are_contiguous_from_one() {
    let dataset = create_sample_dataset().unwrap();
    let (_, events) = build_all(&dataset, &utc_options());

    let mut ids: Vec<i64> = events.songplays.iter().map(|p| p.songplay_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=MATCHED_PLAYS as i64).collect::<Vec<_>>());
}

#[test]
fn test_rebuild_is_idempotent() {
    let dataset = create_sample_dataset().unwrap();
    let (catalog_a, events_a) = build_all(&dataset, &utc_options());
    let (catalog_b, events_b) = build_all(&dataset, &utc_options());

    assert_eq!(as_set(&catalog_a.songs), as_set(&catalog_b.songs));
    assert_eq!(as_set(&catalog_a.artists), as_set(&catalog_b.artists));
    assert_eq!(as_set(&events_a.users), as_set(&events_b.users));
    assert_eq!(as_set(&events_a.time), as_set(&events_b.time));

    let without_ids = |tables: &EventTables| -> HashSet<_> {
        tables
            .songplays
            .iter()
            .cloned()
            .map(|mut p| {
                p.songplay_id = 0;
                p
            })
            .collect()
    };
    assert_eq!(without_ids(&events_a), without_ids(&events_b));
}

#[test]
fn test_hashed_ids_are_stable_across_runs() {
    let dataset = create_sample_dataset().unwrap();
    let options = EventOptions {
        songplay_ids: SongplayIdStrategy::Hashed,
        ..utc_options()
    };
    let (_, first) = build_all(&dataset, &options);
    let (_, second) = build_all(&dataset, &options);

    assert_unique(&first.songplays, |p| p.songplay_id);
    assert_eq!(as_set(&first.songplays), as_set(&second.songplays));
}

#[test]
fn test_malformed_files_do_not_fail_the_run() {
    let dataset = create_sample_dataset().unwrap();
    std::fs::write(
        dataset.input_path().join("log-data/2018/11/broken.json"),
        "{\"page\": \"NextSong\", \"ts\":\n",
    )
    .unwrap();

    let logs = log_source(&dataset.input_path()).unwrap();
    let batch = RecordSource::<LogEvent>::load(&logs).unwrap();
    assert_eq!(batch.stats.files, 3);
    assert!(batch.stats.malformed >= 1);

    let (_, events) = build_all(&dataset, &utc_options());
    assert_eq!(events.songplays.len(), MATCHED_PLAYS);
}
