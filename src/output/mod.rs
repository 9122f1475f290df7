//! Persistence of the warehouse tables.

mod memory;
mod parquet_writer;
mod partition;
mod reader;
mod sink;

pub use memory::MemorySink;
pub use parquet_writer::{ParquetCompression, ParquetTableWriter, SUCCESS_MARKER};
pub use partition::{split_by_partition, PartitionedBatch, NULL_PARTITION};
pub use reader::{read_table, stored_rows, StoredPartition};
pub use sink::{persist_rows, validate_partitioning, PersistReport, TableSink, WriteMode};

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Partition columns {requested:?} of {table} are not a prefix of {grouping:?}")]
    InvalidPartitioning {
        table: String,
        requested: Vec<String>,
        grouping: Vec<String>,
    },

    #[error("Column {column} not found in table {table}")]
    MissingColumn { table: String, column: String },

    #[error("Table {0} would have no data columns left after partitioning")]
    NoDataColumns(String),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list table files: {0}")]
    Walk(#[from] walkdir::Error),
}
