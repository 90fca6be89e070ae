//! The seam between the pipeline and whatever retrieves raw series.

use chrono::NaiveDate;

use crate::domain::Observation;
use crate::error::AppError;

/// Retrieves raw observations for one source series.
///
/// An `Err` means the series is unavailable for this run; the pipeline skips
/// it and keeps going. Implementations should make a single bounded attempt.
pub trait FetchGateway: Send + Sync {
    fn fetch(&self, source_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Observation>, AppError>;
}
