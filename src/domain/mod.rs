//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - registry entries (`SeriesSpec`, `DerivedSpec`, `Frequency`)
//! - raw and normalized series (`Observation`, `MonthlySeries`)
//! - the merged output (`WideTable`)

pub mod table;
pub mod types;

pub use table::*;
pub use types::*;
