use super::partition::{unescape_partition_value, NULL_PARTITION};
use super::OutputError;
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::{Component, Path};
use walkdir::WalkDir;

/// One Parquet file of a persisted table, with the partition values taken
/// from its directory path.
#[derive(Debug, Clone)]
pub struct StoredPartition {
    pub values: Vec<(String, Option<String>)>,
    pub batch: RecordBatch,
}

/// Loads every data file of a table directory written by
/// [`super::ParquetTableWriter`], in path order.
pub fn read_table(table_dir: &Path) -> Result<Vec<StoredPartition>, OutputError> {
    let mut out = Vec::new();
    for entry in WalkDir::new(table_dir).sort_by_file_name() {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy();
        if !entry.file_type().is_file() || !name.ends_with(".parquet") || name.starts_with('.') {
            continue;
        }
        let relative = entry
            .path()
            .parent()
            .and_then(|p| p.strip_prefix(table_dir).ok())
            .unwrap_or_else(|| Path::new(""));
        out.push(StoredPartition {
            values: partition_values(relative),
            batch: read_file(entry.path())?,
        });
    }
    Ok(out)
}

/// Total rows over the partitions returned by [`read_table`].
pub fn stored_rows(partitions: &[StoredPartition]) -> usize {
    partitions.iter().map(|p| p.batch.num_rows()).sum()
}

fn read_file(path: &Path) -> Result<RecordBatch, OutputError> {
    let file = File::open(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let batches = builder
        .build()?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

fn partition_values(relative: &Path) -> Vec<(String, Option<String>)> {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => {
                let part = part.to_string_lossy();
                let (column, value) = part.split_once('=')?;
                let value = if value == NULL_PARTITION {
                    None
                } else {
                    Some(unescape_partition_value(value))
                };
                Some((column.to_string(), value))
            }
            _ => None,
        })
        .collect()
}
