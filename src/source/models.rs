use serde::{Deserialize, Deserializer};

/// Page value that marks a log event as a song playback.
pub const PLAYBACK_PAGE: &str = "NextSong";

/// One song of the catalog, with its artist embedded.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SongRecord {
    pub song_id: Option<String>,
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub year: Option<i32>,
    pub num_songs: Option<i64>,
    pub artist_id: Option<String>,
    pub artist_name: Option<String>,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

/// One user interaction from the application logs.
///
/// Only `page == "NextSong"` events carry `song`, `artist` and `length`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub page: Option<String>,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub ts: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    pub song: Option<String>,
    pub artist: Option<String>,
    pub length: Option<f64>,
}

impl LogEvent {
    pub fn is_playback(&self) -> bool {
        self.page.as_deref() == Some(PLAYBACK_PAGE)
    }

    /// The user id, unless it is missing or blank.
    ///
    /// Logged-out traffic carries `userId: ""`. It is kept as read but never
    /// identifies a user for the `users` and `songplays` tables.
    pub fn known_user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

/// User ids show up both as strings and as numbers depending on the exporter.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrText> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrText::Int(i)) => Some(i.to_string()),
        Some(NumberOrText::Float(f)) if f.is_finite() && f.fract() == 0.0 => {
            Some((f as i64).to_string())
        }
        Some(NumberOrText::Float(f)) => Some(f.to_string()),
        Some(NumberOrText::Text(s)) => Some(s),
        None => None,
    })
}

fn lenient_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrText> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrText::Int(i)) => Some(i),
        Some(NumberOrText::Float(f)) if f.is_finite() => Some(f.trunc() as i64),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
