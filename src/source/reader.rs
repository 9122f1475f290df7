use super::{PathPattern, SourceError};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Counters collected while reading a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    pub files: usize,
    pub records: usize,
    pub malformed: usize,
}

impl ReadStats {
    fn merge(&mut self, other: ReadStats) {
        self.files += other.files;
        self.records += other.records;
        self.malformed += other.malformed;
    }
}

impl fmt::Display for ReadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files, {} records, {} malformed skipped",
            self.files, self.records, self.malformed
        )
    }
}

/// Records loaded from a source, in source order.
#[derive(Debug, Clone)]
pub struct SourceBatch<T> {
    pub records: Vec<T>,
    pub stats: ReadStats,
}

/// A collection of source records the pipelines can pull from.
///
/// Pipelines only depend on this trait, so the binary decides where records
/// come from and tests can feed them from memory.
pub trait RecordSource<T>: Send + Sync {
    fn describe(&self) -> String;

    fn load(&self) -> Result<SourceBatch<T>, SourceError>;
}

/// Reads JSON records from every file below `root` matching a path pattern.
///
/// A file may contain a single object (possibly pretty printed), a JSON array
/// of objects, or newline-delimited objects. Records that fail to decode are
/// skipped and counted, they never fail the read.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    root: PathBuf,
    pattern: PathPattern,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(root: P, pattern: &str) -> Result<Self, SourceError> {
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            pattern: PathPattern::new(pattern)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files matching the pattern, sorted by path.
    ///
    /// Hidden and underscore-prefixed files (`.crc`, `_SUCCESS`, ...) are
    /// never considered data.
    pub fn matching_files(&self) -> Result<Vec<PathBuf>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::MissingRoot(self.root.clone()));
        }
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(self.pattern.depth())
            .max_depth(self.pattern.depth())
            .sort_by_file_name();
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() || is_hidden(entry.file_name()) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or_else(|_| entry.path());
            if self.pattern.matches(relative) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

impl<T> RecordSource<T> for JsonFileSource
where
    T: DeserializeOwned + Send,
{
    fn describe(&self) -> String {
        format!("{}/{}", self.root.display(), self.pattern.as_str())
    }

    fn load(&self) -> Result<SourceBatch<T>, SourceError> {
        let files = self.matching_files()?;
        if files.is_empty() {
            warn!("No files match {}", RecordSource::<T>::describe(self));
        }

        let decoded = files
            .par_iter()
            .map(|path| decode_file::<T>(path))
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::new();
        let mut stats = ReadStats::default();
        for (mut file_records, file_stats) in decoded {
            records.append(&mut file_records);
            stats.merge(file_stats);
        }
        info!("Read {}: {}", RecordSource::<T>::describe(self), stats);
        Ok(SourceBatch { records, stats })
    }
}

/// Records held in memory, handed out as-is.
#[derive(Debug, Clone, Default)]
pub struct MemorySource<T> {
    records: Vec<T>,
}

impl<T> MemorySource<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self { records }
    }
}

impl<T> RecordSource<T> for MemorySource<T>
where
    T: Clone + Send + Sync,
{
    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }

    fn load(&self) -> Result<SourceBatch<T>, SourceError> {
        Ok(SourceBatch {
            records: self.records.clone(),
            stats: ReadStats {
                files: 0,
                records: self.records.len(),
                malformed: 0,
            },
        })
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') || name.starts_with('_')
}

fn decode_file<T: DeserializeOwned>(path: &Path) -> Result<(Vec<T>, ReadStats), SourceError> {
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut stats = ReadStats {
        files: 1,
        ..Default::default()
    };

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => {
            debug!("Skipping non UTF-8 file {}", path.display());
            stats.malformed += 1;
            return Ok((Vec::new(), stats));
        }
    };

    let mut records = Vec::new();
    for (line, value) in split_values(&text) {
        match value.and_then(serde_json::from_value::<T>) {
            Ok(record) => records.push(record),
            Err(err) => {
                debug!("Skipping malformed record {}:{}: {}", path.display(), line, err);
                stats.malformed += 1;
            }
        }
    }
    stats.records = records.len();
    Ok((records, stats))
}

/// Splits a file body into JSON values, tagging each with its 1-based line.
fn split_values(text: &str) -> Vec<(usize, serde_json::Result<Value>)> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => items.into_iter().map(|v| (1, Ok(v))).collect(),
        Ok(value) => vec![(1, Ok(value))],
        Err(_) => text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| (idx + 1, serde_json::from_str::<Value>(line)))
            .collect(),
    }
}
