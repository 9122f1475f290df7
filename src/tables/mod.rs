//! Row types and layout of the five warehouse tables.

mod distinct;
mod rows;

pub use distinct::distinct;
pub use rows::{ArtistRow, SongRow, SongplayRow, TimeRow, UserRow};

use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

/// Name and storage layout of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    /// Columns the rows naturally group by, outermost first. Persisted
    /// partitioning may only use a prefix of these.
    pub grouping: &'static [&'static str],
    /// Partition columns used when the pipelines persist the table.
    pub partition_by: &'static [&'static str],
}

pub const SONGS: TableSpec = TableSpec {
    name: "songs",
    grouping: &["year", "artist_id"],
    partition_by: &["year", "artist_id"],
};

pub const ARTISTS: TableSpec = TableSpec {
    name: "artists",
    grouping: &[],
    partition_by: &[],
};

pub const USERS: TableSpec = TableSpec {
    name: "users",
    grouping: &[],
    partition_by: &[],
};

pub const TIME: TableSpec = TableSpec {
    name: "time",
    grouping: &["year", "month"],
    partition_by: &["year", "month"],
};

pub const SONGPLAYS: TableSpec = TableSpec {
    name: "songplays",
    grouping: &["year", "month"],
    partition_by: &["year", "month"],
};

pub const ALL_TABLES: [TableSpec; 5] = [SONGS, ARTISTS, USERS, TIME, SONGPLAYS];

/// A row type that can be laid out as an Arrow record batch.
pub trait TableRow: Sized {
    const SPEC: TableSpec;

    fn schema() -> SchemaRef;

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch, ArrowError>;
}
