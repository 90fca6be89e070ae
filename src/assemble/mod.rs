//! Merge normalized monthly series into one wide table.
//!
//! The merge is an outer join on month: the index is the union of every month
//! that appears in any input series, and each column is aligned onto it with
//! absent values where that series has no entry. No value is ever carried
//! across columns or rows here; forward-filling already happened per series.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{DerivedSpec, MonthlySeries, WideTable};
use crate::error::AppError;

/// Collects named monthly series and produces a `WideTable`.
///
/// Columns keep the position of their first insertion. Pushing a name twice
/// replaces the earlier series (last write wins); the overwrite is logged.
#[derive(Debug, Default)]
pub struct DatasetAssembler {
    intended: Vec<String>,
    columns: Vec<(String, MonthlySeries)>,
}

impl DatasetAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the column names the caller meant to produce.
    ///
    /// They label the result when no column ends up with data, so an empty
    /// run is distinguishable from one that never happened.
    pub fn with_intended<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            intended: names.into_iter().map(Into::into).collect(),
            columns: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, series: MonthlySeries) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => {
                warn!(column = %name, "duplicate column name; later series replaces earlier one");
                *existing = series;
            }
            None => self.columns.push((name, series)),
        }
    }

    /// True if any pushed series carries at least one value.
    pub fn has_data(&self) -> bool {
        self.columns.iter().any(|(_, s)| s.has_data())
    }

    pub fn finish(self) -> WideTable {
        if !self.has_data() {
            let mut names = self.intended;
            names.extend(self.columns.into_iter().map(|(n, _)| n));
            debug!(columns = names.len(), "no series carried data; returning empty table");
            return WideTable::empty_with_columns(names);
        }

        let index: Vec<NaiveDate> = self
            .columns
            .iter()
            .flat_map(|(_, s)| s.months())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut table = WideTable::with_index(index);
        for (name, series) in &self.columns {
            let values = table.months().iter().map(|m| series.value_at(*m)).collect();
            table.set_column(name, values);
        }
        debug!(rows = table.len(), columns = table.columns().len(), "assembled table");
        table
    }
}

/// Outer-join the given columns, in order, into a wide table.
pub fn assemble<I, S>(columns: I) -> WideTable
where
    I: IntoIterator<Item = (S, MonthlySeries)>,
    S: Into<String>,
{
    let mut assembler = DatasetAssembler::new();
    for (name, series) in columns {
        assembler.push(name, series);
    }
    assembler.finish()
}

/// Add `new_name = numerator / denominator`, elementwise.
///
/// A row is absent when either operand is absent or the denominator is zero.
/// An existing column called `new_name` is replaced.
pub fn derive_ratio(
    table: &mut WideTable,
    numerator: &str,
    denominator: &str,
    new_name: &str,
) -> Result<(), AppError> {
    let num = table
        .column(numerator)
        .ok_or_else(|| AppError::new(3, format!("Missing numerator column '{numerator}'.")))?;
    let den = table
        .column(denominator)
        .ok_or_else(|| AppError::new(3, format!("Missing denominator column '{denominator}'.")))?;

    let values: Vec<Option<f64>> = num
        .values
        .iter()
        .zip(&den.values)
        .map(|(n, d)| match (n, d) {
            (Some(n), Some(d)) if *d != 0.0 => Some(n / d).filter(|v| v.is_finite()),
            _ => None,
        })
        .collect();

    table.set_column(new_name, values);
    Ok(())
}

/// Apply derived ratios in order, skipping (and logging) those whose operands
/// are missing. Returns the names that were skipped.
pub fn apply_derived(table: &mut WideTable, specs: &[DerivedSpec]) -> Vec<String> {
    let mut skipped = Vec::new();
    for spec in specs {
        if let Err(err) = derive_ratio(table, &spec.numerator, &spec.denominator, &spec.name) {
            warn!(column = %spec.name, "skipping derived column: {err}");
            skipped.push(spec.name.clone());
        }
    }
    skipped
}
