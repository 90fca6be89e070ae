//! Shared "refresh" pipeline used by the CLI commands and the integration tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! registry -> fetch -> normalize -> assemble -> derive
//!
//! The front-ends can then focus on persistence and presentation.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assemble::{DatasetAssembler, apply_derived};
use crate::data::{FetchGateway, SeriesRegistry};
use crate::domain::{FetchConfig, MonthRange, MonthlySeries, SeriesSpec, WideTable};
use crate::error::AppError;
use crate::resample::normalize_within;

/// Why a registry entry is missing from the assembled table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSeries {
    pub name: String,
    pub source_id: String,
    pub reason: String,
}

/// The output of one refresh run.
///
/// Replaces any notion of a process-wide "current dataset": callers hold the
/// snapshot they were given and know exactly when it was built.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    pub table: WideTable,
    pub refreshed_at: DateTime<Utc>,
    pub range: MonthRange,
    pub skipped: Vec<SkippedSeries>,
    /// Derived columns that could not be computed (missing operands).
    pub skipped_derived: Vec<String>,
}

impl DatasetSnapshot {
    /// True when the run completed but no series returned any data.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Fetch and normalize one series. `Err` carries the skip reason.
///
/// Only a gateway failure or an empty response is a skip. A series whose
/// values are all missing markers is kept as an all-absent column.
fn load_series<G>(gateway: &G, spec: &SeriesSpec, config: &FetchConfig) -> Result<MonthlySeries, String>
where
    G: FetchGateway + ?Sized,
{
    let observations = gateway
        .fetch(&spec.source_id, config.observation_start, config.observation_end)
        .map_err(|e| e.to_string())?;

    if observations.is_empty() {
        return Err("no observations returned".to_string());
    }

    let series = normalize_within(&observations, spec.frequency, &config.range);
    if !series.has_data() {
        warn!(series = %spec.display_name, id = %spec.source_id, "no numeric observations; column stays absent");
    }

    info!(
        series = %spec.display_name,
        id = %spec.source_id,
        freq = %spec.frequency,
        months = series.len(),
        "normalized"
    );
    Ok(series)
}

/// Execute the full refresh pipeline.
///
/// Unavailable series are logged and skipped; the run itself only fails on
/// errors that are not tied to a single series.
pub fn run_refresh<G>(gateway: &G, registry: &SeriesRegistry, config: &FetchConfig) -> Result<DatasetSnapshot, AppError>
where
    G: FetchGateway + ?Sized,
{
    if registry.is_empty() {
        return Err(AppError::new(2, "Series registry is empty; nothing to fetch."));
    }
    let specs = registry.all_specs();
    info!(series = specs.len(), range = %config.range, parallel = config.parallel, "refreshing");

    // Indexed collection keeps registry order regardless of completion order.
    let results: Vec<Result<MonthlySeries, String>> = if config.parallel {
        specs
            .par_iter()
            .map(|spec| load_series(gateway, spec, config))
            .collect()
    } else {
        specs.iter().map(|spec| load_series(gateway, spec, config)).collect()
    };

    let mut assembler = DatasetAssembler::with_intended(specs.iter().map(|s| s.display_name.clone()));
    let mut skipped = Vec::new();

    for (spec, result) in specs.iter().zip(results) {
        match result {
            Ok(series) => assembler.push(spec.display_name.clone(), series),
            Err(reason) => {
                warn!(series = %spec.display_name, id = %spec.source_id, "skipping series: {reason}");
                skipped.push(SkippedSeries {
                    name: spec.display_name.clone(),
                    source_id: spec.source_id.clone(),
                    reason,
                });
            }
        }
    }

    if !assembler.has_data() {
        warn!("no series returned data; producing an empty table");
    }

    let mut table = assembler.finish();
    let skipped_derived = apply_derived(&mut table, registry.derived());

    info!(
        rows = table.len(),
        columns = table.columns().len(),
        skipped = skipped.len(),
        "refresh complete"
    );

    Ok(DatasetSnapshot {
        table,
        refreshed_at: Utc::now(),
        range: config.range,
        skipped,
        skipped_derived,
    })
}
