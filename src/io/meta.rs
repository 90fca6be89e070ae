//! JSON metadata sidecar written next to each table CSV.
//!
//! Layout: `{output}.meta.json`, holding when the data was refreshed, the
//! requested range, the series definitions the table was built from, and
//! which series were skipped and why.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::pipeline::{DatasetSnapshot, SkippedSeries};
use crate::data::SeriesRegistry;
use crate::domain::{DerivedSpec, MonthRange, SeriesSpec};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    pub tool: String,
    pub refreshed_at: DateTime<Utc>,
    pub range: MonthRange,
    pub rows: usize,
    pub columns: Vec<String>,
    pub series: Vec<SeriesSpec>,
    pub derived: Vec<DerivedSpec>,
    pub skipped: Vec<SkippedSeries>,
    pub skipped_derived: Vec<String>,
}

impl TableMeta {
    pub fn from_snapshot(snapshot: &DatasetSnapshot, registry: &SeriesRegistry) -> Self {
        Self {
            tool: "econ".to_string(),
            refreshed_at: snapshot.refreshed_at,
            range: snapshot.range,
            rows: snapshot.table.len(),
            columns: snapshot
                .table
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            series: registry.all_specs().to_vec(),
            derived: registry.derived().to_vec(),
            skipped: snapshot.skipped.clone(),
            skipped_derived: snapshot.skipped_derived.clone(),
        }
    }
}

/// Sidecar path for a table written to `table_path`.
pub fn meta_path(table_path: &Path) -> PathBuf {
    let mut name = table_path.as_os_str().to_owned();
    name.push(".meta.json");
    PathBuf::from(name)
}

pub fn write_meta_json(path: &Path, meta: &TableMeta) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create metadata '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, meta)
        .map_err(|e| AppError::new(2, format!("Failed to write metadata JSON: {e}")))?;
    Ok(())
}

pub fn read_meta_json(path: &Path) -> Result<TableMeta, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open metadata '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid metadata JSON: {e}")))
}
