//! Batch ETL turning raw song metadata and listening logs into a partitioned
//! star schema: `songplays` facts plus `songs`, `artists`, `users` and `time`
//! dimensions, stored as Parquet.

pub mod catalog;
pub mod config;
pub mod events;
pub mod output;
pub mod run;
pub mod source;
pub mod tables;

pub use run::{run_batch, verify_output, RunSummary};
