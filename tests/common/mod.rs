//! Common test infrastructure
//!
//! Builds throwaway source trees and reads values back out of Arrow batches.
//! Tests should only import from this module, not from internal submodules.

// Not every test binary uses every helper.
#[allow(dead_code)]
mod columns;
#[allow(dead_code)]
mod constants;
#[allow(dead_code)]
mod fixtures;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use columns::{i64_column, string_column, timestamp_column};
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{create_sample_dataset, page_event, playback, song, TestDataset};
