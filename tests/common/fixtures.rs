//! On-disk source datasets for the integration tests

use super::constants::*;
use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary `input/` tree laid out like the real source buckets, plus an
/// empty `output/` location next to it.
pub struct TestDataset {
    dir: TempDir,
}

impl TestDataset {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        fs::create_dir_all(dir.path().join("input"))?;
        Ok(Self { dir })
    }

    pub fn input_path(&self) -> PathBuf {
        self.dir.path().join("input")
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    /// Writes one pretty printed song file at `song_data/<relative>`.
    pub fn write_song(&self, relative: &str, record: &Value) -> Result<()> {
        let path = self.input_path().join("song_data").join(relative);
        write_file(&path, &serde_json::to_string_pretty(record)?)
    }

    /// Writes newline-delimited events to `log-data/2018/11/<name>`.
    pub fn write_log_file(&self, name: &str, events: &[Value]) -> Result<()> {
        let path = self.input_path().join("log-data/2018/11").join(name);
        let lines: Vec<String> = events.iter().map(Value::to_string).collect();
        write_file(&path, &lines.join("\n"))
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

pub fn song(
    song_id: &str,
    title: &str,
    artist_id: &str,
    artist_name: &str,
    duration: f64,
    year: i32,
) -> Value {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": duration,
        "year": year,
    })
}

pub fn playback(user_id: &str, level: &str, artist: &str, song: &str, length: f64, ts: i64) -> Value {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": format!("First{}", user_id),
        "gender": "F",
        "itemInSession": 0,
        "lastName": format!("Last{}", user_id),
        "length": length,
        "level": level,
        "location": "San Jose-Sunnyvale-Santa Clara, CA",
        "method": "PUT",
        "page": "NextSong",
        "registration": 1_540_266_185_796.0_f64,
        "sessionId": 221,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": user_id,
    })
}

pub fn page_event(page: &str, user_id: &str, level: &str, ts: i64) -> Value {
    json!({
        "artist": null,
        "auth": "Logged In",
        "firstName": format!("First{}", user_id),
        "gender": "M",
        "lastName": format!("Last{}", user_id),
        "length": null,
        "level": level,
        "page": page,
        "sessionId": 9,
        "song": null,
        "ts": ts,
        "userId": user_id,
    })
}

/// Creates the standard dataset: two songs by two artists (song 1 stored
/// twice), and two days of logs with matched, unmatched, anonymous and
/// non-playback events.
pub fn create_sample_dataset() -> Result<TestDataset> {
    let dataset = TestDataset::new()?;

    let song_1 = song(SONG_1_ID, SONG_1_TITLE, ARTIST_1_ID, ARTIST_1_NAME, SONG_1_DURATION, 2000);
    let song_2 = song(SONG_2_ID, SONG_2_TITLE, ARTIST_2_ID, ARTIST_2_NAME, SONG_2_DURATION, 0);
    dataset.write_song("A/A/A/TRAAAAW128F429D538.json", &song_1)?;
    dataset.write_song("A/B/C/TRABCEI128F424C983.json", &song_2)?;
    dataset.write_song("B/A/A/TRBAAAX128F4291DB2.json", &song_1)?;

    dataset.write_log_file(
        "2018-11-01-events.json",
        &[
            page_event("Home", USER_UPGRADING, "free", TS_FIRST_PLAY - 60_000),
            playback(USER_UPGRADING, "free", ARTIST_1_NAME, SONG_1_TITLE, SONG_1_DURATION, TS_FIRST_PLAY),
            page_event("Upgrade", USER_UPGRADING, "free", TS_FIRST_PLAY + 30_000),
            playback(USER_UPGRADING, "paid", ARTIST_2_NAME, SONG_2_TITLE, SONG_2_DURATION, TS_UPGRADED_PLAY),
            playback(USER_UNMATCHED, "free", "Nobody", "Unknown Track", 123.4, TS_UNMATCHED_PLAY),
            playback("", "free", ARTIST_1_NAME, SONG_1_TITLE, SONG_1_DURATION, TS_UNMATCHED_PLAY + 1_000),
            page_event("Logout", USER_BROWSING, "paid", TS_UNMATCHED_PLAY + 5_000),
        ],
    )?;
    dataset.write_log_file(
        "2018-11-02-events.json",
        &[
            page_event("Home", USER_BROWSING, "paid", TS_SECOND_DAY_PLAY - 1_000),
            playback(USER_SECOND_DAY, "free", ARTIST_1_NAME, SONG_1_TITLE, SONG_1_DURATION, TS_SECOND_DAY_PLAY),
        ],
    )?;

    Ok(dataset)
}
