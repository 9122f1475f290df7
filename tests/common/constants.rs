//! Shared constants for the integration tests
//!
//! The sample dataset built by `create_sample_dataset` uses exactly these
//! values. When the sample data changes, update only this file.

// ============================================================================
// Catalog
// ============================================================================

pub const SONG_1_ID: &str = "SOUPIRU12A6D4FA1E1";
pub const SONG_1_TITLE: &str = "Der Kleine Dompfaff";
pub const SONG_1_DURATION: f64 = 152.92036;

pub const SONG_2_ID: &str = "SOZCTXZ12AB0182364";
pub const SONG_2_TITLE: &str = "Setanta matins";
pub const SONG_2_DURATION: f64 = 269.58322;

pub const ARTIST_1_ID: &str = "ARJIE2Y1187B994AB7";
pub const ARTIST_1_NAME: &str = "Line Renaud";

pub const ARTIST_2_ID: &str = "AR5KOSW1187FB35FF4";
pub const ARTIST_2_NAME: &str = "Elena";

// ============================================================================
// Users
// ============================================================================

/// Plays both songs, upgrading from free to paid in between.
pub const USER_UPGRADING: &str = "26";

/// Plays song 1 once, on the second day.
pub const USER_SECOND_DAY: &str = "8";

/// Only plays a track missing from the catalog.
pub const USER_UNMATCHED: &str = "97";

/// Only navigates, never plays anything.
pub const USER_BROWSING: &str = "15";

// ============================================================================
// Timestamps (epoch milliseconds, all in November 2018 UTC)
// ============================================================================

/// 2018-11-01 20:57:10 UTC
pub const TS_FIRST_PLAY: i64 = 1_541_105_830_796;
/// 2018-11-01 21:01:46 UTC
pub const TS_UPGRADED_PLAY: i64 = 1_541_106_106_796;
/// 2018-11-01 21:05:52 UTC
pub const TS_UNMATCHED_PLAY: i64 = 1_541_106_352_796;
/// 2018-11-02 20:20:00 UTC
pub const TS_SECOND_DAY_PLAY: i64 = 1_541_190_000_000;

pub const MATCHED_PLAYS: usize = 3;
