use super::partition::split_by_partition;
use super::sink::{validate_partitioning, PersistReport, TableSink, WriteMode};
use super::OutputError;
use crate::tables::TableSpec;
use arrow::record_batch::RecordBatch;
use clap::ValueEnum;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Marker file written into every completely written table directory.
pub const SUCCESS_MARKER: &str = "_SUCCESS";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ParquetCompression {
    #[default]
    Snappy,
    Zstd,
    None,
}

impl ParquetCompression {
    fn codec(self) -> Compression {
        match self {
            ParquetCompression::Snappy => Compression::SNAPPY,
            ParquetCompression::Zstd => Compression::ZSTD(ZstdLevel::default()),
            ParquetCompression::None => Compression::UNCOMPRESSED,
        }
    }
}

/// Writes each table as a directory of Parquet files below `base`.
///
/// A table is first written to a hidden staging directory next to its final
/// location and only swapped in once every file is on disk, so readers never
/// see a half-written table. Nothing spans several tables.
#[derive(Debug, Clone)]
pub struct ParquetTableWriter {
    base: PathBuf,
    compression: ParquetCompression,
}

impl ParquetTableWriter {
    pub fn new<P: Into<PathBuf>>(base: P, compression: ParquetCompression) -> Self {
        Self {
            base: base.into(),
            compression,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn table_path(&self, table: &TableSpec) -> PathBuf {
        self.base.join(table.name)
    }

    fn write_file(&self, path: &Path, batch: &RecordBatch) -> Result<(), OutputError> {
        let file = File::create(path).map_err(|source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let props = WriterProperties::builder()
            .set_compression(self.compression.codec())
            .build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;
        Ok(())
    }

    /// Writes one file per partition under `staging`, returning the
    /// partition count.
    fn stage(
        &self,
        staging: &Path,
        batch: &RecordBatch,
        partition_by: &[&str],
    ) -> Result<usize, OutputError> {
        let partitions = split_by_partition(batch, partition_by)?;
        create_dir(staging)?;
        for (idx, partition) in partitions.iter().enumerate() {
            let dir = staging.join(partition.relative_dir());
            create_dir(&dir)?;
            let file = dir.join(format!("part-{:05}.{}.parquet", idx, self.codec_suffix()));
            debug!(
                "Writing {} rows to {}",
                partition.batch.num_rows(),
                file.display()
            );
            self.write_file(&file, &partition.batch)?;
        }
        let marker = staging.join(SUCCESS_MARKER);
        File::create(&marker).map_err(|source| OutputError::Io {
            path: marker,
            source,
        })?;
        Ok(partitions.len())
    }

    fn codec_suffix(&self) -> &'static str {
        match self.compression {
            ParquetCompression::Snappy => "snappy",
            ParquetCompression::Zstd => "zstd",
            ParquetCompression::None => "uncompressed",
        }
    }

    /// Replaces `target` with `staging`. If `staging` cannot be moved into
    /// place the previous `target` is put back before the error is returned.
    fn swap_in(&self, table: &TableSpec, staging: &Path, target: &Path) -> Result<(), OutputError> {
        let retired = if target.exists() {
            let retired = self
                .base
                .join(format!(".{}.{}.old", table.name, Uuid::new_v4()));
            rename(target, &retired)?;
            Some(retired)
        } else {
            None
        };
        if let Err(e) = rename(staging, target) {
            if let Some(retired) = &retired {
                if let Err(restore) = fs::rename(retired, target) {
                    warn!(
                        "Failed to restore previous {} output from {}: {}",
                        table.name,
                        retired.display(),
                        restore
                    );
                }
            }
            return Err(e);
        }
        if let Some(retired) = retired {
            if let Err(e) = fs::remove_dir_all(&retired) {
                warn!(
                    "Failed to remove previous {} output at {}: {}",
                    table.name,
                    retired.display(),
                    e
                );
            }
        }
        Ok(())
    }
}

impl TableSink for ParquetTableWriter {
    fn persist(
        &self,
        table: &TableSpec,
        batch: &RecordBatch,
        partition_by: &[&str],
        mode: WriteMode,
    ) -> Result<PersistReport, OutputError> {
        validate_partitioning(table, batch.schema_ref(), partition_by)?;
        debug!("Persisting {} in {:?} mode", table.name, mode);

        create_dir(&self.base)?;
        let target = self.table_path(table);
        let staging = self
            .base
            .join(format!(".{}.{}.staging", table.name, Uuid::new_v4()));

        let partitions = match self.stage(&staging, batch, partition_by) {
            Ok(count) => count,
            Err(e) => {
                let _ = fs::remove_dir_all(&staging);
                return Err(e);
            }
        };
        if let Err(e) = self.swap_in(table, &staging, &target) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        info!(
            "Wrote {}: {} rows in {} partitions to {}",
            table.name,
            batch.num_rows(),
            partitions,
            target.display()
        );
        Ok(PersistReport {
            table: table.name,
            rows: batch.num_rows(),
            partitions,
            files: partitions,
        })
    }
}

fn create_dir(path: &Path) -> Result<(), OutputError> {
    fs::create_dir_all(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn rename(from: &Path, to: &Path) -> Result<(), OutputError> {
    fs::rename(from, to).map_err(|source| OutputError::Io {
        path: from.to_path_buf(),
        source,
    })
}
