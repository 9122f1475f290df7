use super::partition::{split_by_partition, PartitionedBatch};
use super::sink::{validate_partitioning, PersistReport, TableSink, WriteMode};
use super::OutputError;
use crate::tables::TableSpec;
use arrow::record_batch::RecordBatch;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Keeps persisted tables in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: Mutex<BTreeMap<String, Vec<PartitionedBatch>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<Vec<PartitionedBatch>> {
        self.tables
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub fn row_count(&self, name: &str) -> Option<usize> {
        self.table(name)
            .map(|parts| parts.iter().map(|p| p.batch.num_rows()).sum())
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

impl TableSink for MemorySink {
    fn persist(
        &self,
        table: &TableSpec,
        batch: &RecordBatch,
        partition_by: &[&str],
        _mode: WriteMode,
    ) -> Result<PersistReport, OutputError> {
        validate_partitioning(table, batch.schema_ref(), partition_by)?;
        let partitions = split_by_partition(batch, partition_by)?;
        let count = partitions.len();
        self.tables
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(table.name.to_string(), partitions);
        Ok(PersistReport {
            table: table.name,
            rows: batch.num_rows(),
            partitions: count,
            files: 0,
        })
    }
}
