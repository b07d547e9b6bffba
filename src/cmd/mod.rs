pub mod chart;
pub mod export;
pub mod schema;
pub mod serve;
pub mod tables;

use crate::core::DatasetStore;
use anyhow::Context;
use std::path::Path;

/// Load every result table, failing with the directory in the message.
pub fn load_store(results_dir: &Path) -> anyhow::Result<DatasetStore> {
    DatasetStore::load(results_dir)
        .with_context(|| format!("Failed to load results from {}", results_dir.display()))
}
