//! Catalog pipeline: song records in, `songs` and `artists` out.

mod extract;

pub use extract::{extract_artists, extract_songs};

use crate::output::{persist_rows, PersistReport, TableSink};
use crate::source::{ReadStats, RecordSource, SongRecord};
use crate::tables::{ArtistRow, SongRow};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// The catalog records as read, shared read-only with the event pipeline.
///
/// The songplays join runs against these rather than the `songs` table
/// because it needs the artist name, which `songs` does not carry.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    records: Arc<Vec<SongRecord>>,
}

impl CatalogView {
    pub fn new(records: Vec<SongRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn records(&self) -> &[SongRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CatalogTables {
    pub songs: Vec<SongRow>,
    pub artists: Vec<ArtistRow>,
}

pub fn build_catalog_tables(records: &[SongRecord]) -> CatalogTables {
    CatalogTables {
        songs: extract_songs(records),
        artists: extract_artists(records),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CatalogReport {
    pub read: ReadStats,
    pub songs: PersistReport,
    pub artists: PersistReport,
}

/// Reads the catalog, persists `songs` then `artists`, and returns the view
/// the event pipeline joins against.
pub fn run_catalog_pipeline(
    source: &dyn RecordSource<SongRecord>,
    sink: &dyn TableSink,
) -> Result<(CatalogView, CatalogReport)> {
    info!("Reading song data from {}...", source.describe());
    let batch = source
        .load()
        .with_context(|| format!("Failed to read song data from {}", source.describe()))?;

    let tables = build_catalog_tables(&batch.records);
    info!(
        "Extracted {} songs and {} artists from {} records",
        tables.songs.len(),
        tables.artists.len(),
        batch.records.len()
    );

    let songs = persist_rows(sink, &tables.songs).context("Failed to write songs table")?;
    let artists = persist_rows(sink, &tables.artists).context("Failed to write artists table")?;

    let report = CatalogReport {
        read: batch.stats,
        songs,
        artists,
    };
    Ok((CatalogView::new(batch.records), report))
}
