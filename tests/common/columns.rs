//! Typed access to record batch columns

use arrow::array::{Array, Int64Array, StringArray, TimestampMicrosecondArray};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDateTime};

pub fn string_column(batch: &RecordBatch, name: &str) -> Vec<Option<String>> {
    let column = batch
        .column_by_name(name)
        .unwrap_or_else(|| panic!("missing column {name}"));
    let array = column
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap_or_else(|| panic!("column {name} is not utf8"));
    (0..array.len())
        .map(|i| (!array.is_null(i)).then(|| array.value(i).to_string()))
        .collect()
}

pub fn i64_column(batch: &RecordBatch, name: &str) -> Vec<i64> {
    let column = batch
        .column_by_name(name)
        .unwrap_or_else(|| panic!("missing column {name}"));
    let array = column
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap_or_else(|| panic!("column {name} is not int64"));
    array.values().to_vec()
}

pub fn timestamp_column(batch: &RecordBatch, name: &str) -> Vec<NaiveDateTime> {
    let column = batch
        .column_by_name(name)
        .unwrap_or_else(|| panic!("missing column {name}"));
    let array = column
        .as_any()
        .downcast_ref::<TimestampMicrosecondArray>()
        .unwrap_or_else(|| panic!("column {name} is not a microsecond timestamp"));
    array
        .values()
        .iter()
        .map(|micros| {
            DateTime::from_timestamp_micros(*micros)
                .expect("timestamp in range")
                .naive_utc()
        })
        .collect()
}
