use super::distinct::float_key;
use super::{TableRow, TableSpec, ARTISTS, SONGPLAYS, SONGS, TIME, USERS};
use arrow::array::{
    ArrayRef, Float64Array, Int32Array, Int64Array, StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

fn start_time_field(nullable: bool) -> Field {
    Field::new(
        "start_time",
        DataType::Timestamp(TimeUnit::Microsecond, None),
        nullable,
    )
}

fn timestamps<'a>(values: impl Iterator<Item = &'a NaiveDateTime>) -> ArrayRef {
    Arc::new(TimestampMicrosecondArray::from_iter_values(
        values.map(|t| t.and_utc().timestamp_micros()),
    ))
}

// ============================================================================
// songs
// ============================================================================

#[derive(Debug, Clone)]
pub struct SongRow {
    pub song_id: String,
    pub title: Option<String>,
    pub artist_id: Option<String>,
    pub year: Option<i32>,
    pub duration: Option<f64>,
}

impl PartialEq for SongRow {
    fn eq(&self, other: &Self) -> bool {
        self.song_id == other.song_id
            && self.title == other.title
            && self.artist_id == other.artist_id
            && self.year == other.year
            && float_key(self.duration) == float_key(other.duration)
    }
}

impl Eq for SongRow {}

impl Hash for SongRow {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.song_id.hash(state);
        self.title.hash(state);
        self.artist_id.hash(state);
        self.year.hash(state);
        float_key(self.duration).hash(state);
    }
}

impl TableRow for SongRow {
    const SPEC: TableSpec = SONGS;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("song_id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("year", DataType::Int32, true),
            Field::new("duration", DataType::Float64, true),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.song_id.as_str()),
            )),
            Arc::new(StringArray::from_iter(rows.iter().map(|r| r.title.as_deref()))),
            Arc::new(StringArray::from_iter(
                rows.iter().map(|r| r.artist_id.as_deref()),
            )),
            Arc::new(Int32Array::from_iter(rows.iter().map(|r| r.year))),
            Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.duration))),
        ];
        RecordBatch::try_new(Self::schema(), columns)
    }
}

// ============================================================================
// artists
// ============================================================================

#[derive(Debug, Clone)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PartialEq for ArtistRow {
    fn eq(&self, other: &Self) -> bool {
        self.artist_id == other.artist_id
            && self.name == other.name
            && self.location == other.location
            && float_key(self.latitude) == float_key(other.latitude)
            && float_key(self.longitude) == float_key(other.longitude)
    }
}

impl Eq for ArtistRow {}

impl Hash for ArtistRow {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.artist_id.hash(state);
        self.name.hash(state);
        self.location.hash(state);
        float_key(self.latitude).hash(state);
        float_key(self.longitude).hash(state);
    }
}

impl TableRow for ArtistRow {
    const SPEC: TableSpec = ARTISTS;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("longitude", DataType::Float64, true),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.artist_id.as_str()),
            )),
            Arc::new(StringArray::from_iter(rows.iter().map(|r| r.name.as_deref()))),
            Arc::new(StringArray::from_iter(
                rows.iter().map(|r| r.location.as_deref()),
            )),
            Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.latitude))),
            Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.longitude))),
        ];
        RecordBatch::try_new(Self::schema(), columns)
    }
}

// ============================================================================
// users
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserRow {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

impl TableRow for UserRow {
    const SPEC: TableSpec = USERS;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("user_id", DataType::Utf8, false),
            Field::new("first_name", DataType::Utf8, true),
            Field::new("last_name", DataType::Utf8, true),
            Field::new("gender", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.user_id.as_str()),
            )),
            Arc::new(StringArray::from_iter(
                rows.iter().map(|r| r.first_name.as_deref()),
            )),
            Arc::new(StringArray::from_iter(
                rows.iter().map(|r| r.last_name.as_deref()),
            )),
            Arc::new(StringArray::from_iter(rows.iter().map(|r| r.gender.as_deref()))),
            Arc::new(StringArray::from_iter(rows.iter().map(|r| r.level.as_deref()))),
        ];
        RecordBatch::try_new(Self::schema(), columns)
    }
}

// ============================================================================
// time
// ============================================================================

/// Calendar breakdown of one playback start time.
///
/// `week` is the ISO week number, `weekday` counts 1 = Sunday to 7 = Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeRow {
    pub start_time: NaiveDateTime,
    pub hour: i32,
    pub day: i32,
    pub week: i32,
    pub month: i32,
    pub year: i32,
    pub weekday: i32,
}

impl TableRow for TimeRow {
    const SPEC: TableSpec = TIME;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            start_time_field(false),
            Field::new("hour", DataType::Int32, false),
            Field::new("day", DataType::Int32, false),
            Field::new("week", DataType::Int32, false),
            Field::new("month", DataType::Int32, false),
            Field::new("year", DataType::Int32, false),
            Field::new("weekday", DataType::Int32, false),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            timestamps(rows.iter().map(|r| &r.start_time)),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.hour))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.day))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.week))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.month))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.weekday))),
        ];
        RecordBatch::try_new(Self::schema(), columns)
    }
}

// ============================================================================
// songplays
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SongplayRow {
    pub songplay_id: i64,
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

impl TableRow for SongplayRow {
    const SPEC: TableSpec = SONGPLAYS;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("songplay_id", DataType::Int64, false),
            start_time_field(false),
            Field::new("user_id", DataType::Utf8, false),
            Field::new("level", DataType::Utf8, true),
            Field::new("song_id", DataType::Utf8, false),
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("session_id", DataType::Int64, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("user_agent", DataType::Utf8, true),
            Field::new("year", DataType::Int32, false),
            Field::new("month", DataType::Int32, false),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from_iter_values(
                rows.iter().map(|r| r.songplay_id),
            )),
            timestamps(rows.iter().map(|r| &r.start_time)),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.user_id.as_str()),
            )),
            Arc::new(StringArray::from_iter(rows.iter().map(|r| r.level.as_deref()))),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.song_id.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.artist_id.as_str()),
            )),
            Arc::new(Int64Array::from_iter(rows.iter().map(|r| r.session_id))),
            Arc::new(StringArray::from_iter(
                rows.iter().map(|r| r.location.as_deref()),
            )),
            Arc::new(StringArray::from_iter(
                rows.iter().map(|r| r.user_agent.as_deref()),
            )),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.month))),
        ];
        RecordBatch::try_new(Self::schema(), columns)
    }
}
