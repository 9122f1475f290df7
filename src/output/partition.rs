use arrow::array::{Array, UInt32Array};
use arrow::compute::take_record_batch;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Directory value used for null (or empty) partition values.
pub const NULL_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// The rows of one partition, with the partition columns stripped out.
#[derive(Debug, Clone)]
pub struct PartitionedBatch {
    /// `(column, value)` pairs, outermost partition first.
    pub values: Vec<(String, Option<String>)>,
    pub batch: RecordBatch,
}

impl PartitionedBatch {
    /// `col=value` directory path of this partition, relative to the table.
    pub fn relative_dir(&self) -> PathBuf {
        self.values
            .iter()
            .map(|(column, value)| {
                let value = match value.as_deref() {
                    Some(v) if !v.is_empty() => escape_partition_value(v),
                    _ => NULL_PARTITION.to_string(),
                };
                format!("{}={}", column, value)
            })
            .collect()
    }
}

/// Groups the rows of `batch` by the values of `partition_by`.
///
/// Groups come out in ascending key order and keep their rows in batch order.
/// Without partition columns the whole batch is one group.
pub fn split_by_partition(
    batch: &RecordBatch,
    partition_by: &[&str],
) -> Result<Vec<PartitionedBatch>, ArrowError> {
    if partition_by.is_empty() {
        return Ok(vec![PartitionedBatch {
            values: Vec::new(),
            batch: batch.clone(),
        }]);
    }

    let schema = batch.schema();
    let key_indices = partition_by
        .iter()
        .map(|column| schema.index_of(column))
        .collect::<Result<Vec<_>, _>>()?;

    let options = FormatOptions::default();
    let formatters = key_indices
        .iter()
        .map(|&idx| ArrayFormatter::try_new(batch.column(idx).as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut groups: BTreeMap<Vec<Option<String>>, Vec<u32>> = BTreeMap::new();
    for row in 0..batch.num_rows() {
        let key = key_indices
            .iter()
            .zip(&formatters)
            .map(|(&idx, formatter)| {
                if batch.column(idx).is_null(row) {
                    None
                } else {
                    Some(formatter.value(row).to_string())
                }
            })
            .collect();
        groups.entry(key).or_default().push(row as u32);
    }

    let data_indices: Vec<usize> = (0..schema.fields().len())
        .filter(|idx| !key_indices.contains(idx))
        .collect();
    let data = batch.project(&data_indices)?;

    groups
        .into_iter()
        .map(|(key, rows)| {
            let batch = take_record_batch(&data, &UInt32Array::from(rows))?;
            let values = partition_by
                .iter()
                .map(|column| column.to_string())
                .zip(key)
                .collect();
            Ok(PartitionedBatch { values, batch })
        })
        .collect()
}

fn needs_escape(c: char) -> bool {
    c < ' '
        || matches!(
            c,
            '"' | '#' | '%' | '\'' | '*' | '/' | ':' | '=' | '?' | '\\' | '\x7F' | '{' | '['
                | ']' | '^'
        )
}

/// Percent-encodes characters that cannot appear in a partition directory.
pub fn escape_partition_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if needs_escape(c) {
            out.push_str(&format!("%{:02X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

pub fn unescape_partition_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            let hex: String = chars.clone().take(2).collect();
            if let Some(decoded) = u8::from_str_radix(&hex, 16)
                .ok()
                .filter(|_| hex.len() == 2)
            {
                out.push(decoded as char);
                chars.nth(1);
                continue;
            }
        }
        out.push(c);
    }
    out
}
