//! Source readers for the catalog and event datasets.

mod models;
mod pattern;
mod reader;

pub use models::{LogEvent, SongRecord, PLAYBACK_PAGE};
pub use pattern::PathPattern;
pub use reader::{JsonFileSource, MemorySource, ReadStats, RecordSource, SourceBatch};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Location of the song files below the input base path.
pub const SONG_DATA_PATTERN: &str = "song_data/*/*/*/*";

/// Location of the log files below the input base path.
pub const LOG_DATA_PATTERN: &str = "log-data/*/*/*";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Invalid path pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Path pattern has no segments")]
    EmptyPattern,

    #[error("Source root does not exist or is not a directory: {0:?}")]
    MissingRoot(PathBuf),

    #[error("Failed to list source files: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The song/artist catalog source under `input_data`.
pub fn song_source(input_data: &Path) -> Result<JsonFileSource, SourceError> {
    JsonFileSource::new(input_data, SONG_DATA_PATTERN)
}

/// The application log source under `input_data`.
pub fn log_source(input_data: &Path) -> Result<JsonFileSource, SourceError> {
    JsonFileSource::new(input_data, LOG_DATA_PATTERN)
}
