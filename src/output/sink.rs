use super::OutputError;
use crate::tables::{TableRow, TableSpec};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;

/// How a persisted table treats what is already stored for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the whole table, every run is a full rebuild.
    #[default]
    Overwrite,
}

/// What a single `persist` call wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistReport {
    pub table: &'static str,
    pub rows: usize,
    pub partitions: usize,
    pub files: usize,
}

/// Destination for the warehouse tables.
pub trait TableSink: Send + Sync {
    /// Stores `batch` as the full content of `table`, laid out by the
    /// `partition_by` columns.
    fn persist(
        &self,
        table: &TableSpec,
        batch: &RecordBatch,
        partition_by: &[&str],
        mode: WriteMode,
    ) -> Result<PersistReport, OutputError>;
}

/// Checks that `partition_by` names columns of `schema`, is a prefix of the
/// table's natural grouping and leaves at least one data column.
pub fn validate_partitioning(
    table: &TableSpec,
    schema: &Schema,
    partition_by: &[&str],
) -> Result<(), OutputError> {
    for column in partition_by {
        if schema.index_of(column).is_err() {
            return Err(OutputError::MissingColumn {
                table: table.name.to_string(),
                column: column.to_string(),
            });
        }
    }
    if !table.grouping.starts_with(partition_by) {
        return Err(OutputError::InvalidPartitioning {
            table: table.name.to_string(),
            requested: partition_by.iter().map(|c| c.to_string()).collect(),
            grouping: table.grouping.iter().map(|c| c.to_string()).collect(),
        });
    }
    if partition_by.len() >= schema.fields().len() {
        return Err(OutputError::NoDataColumns(table.name.to_string()));
    }
    Ok(())
}

/// Persists typed rows with the table's own partitioning, overwriting it.
pub fn persist_rows<T: TableRow>(
    sink: &dyn TableSink,
    rows: &[T],
) -> Result<PersistReport, OutputError> {
    let batch = T::to_record_batch(rows)?;
    sink.persist(&T::SPEC, &batch, T::SPEC.partition_by, WriteMode::Overwrite)
}
