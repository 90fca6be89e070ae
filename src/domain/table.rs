//! The merged, month-indexed table.

use chrono::NaiveDate;

use crate::domain::{MonthRange, month_start};
use crate::error::AppError;

/// One named column aligned to the table index.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Month-indexed wide table.
///
/// Invariants:
/// - `months` is strictly ascending and holds first-of-month dates
/// - every column has exactly `months.len()` values
/// - column names are unique; column order is insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    months: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl WideTable {
    /// A table with no rows that still carries its column names.
    pub fn empty_with_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for name in names {
            let name = name.into();
            if !table.has_column(&name) {
                table.columns.push(Column { name, values: Vec::new() });
            }
        }
        table
    }

    /// Build a table from parts, validating the invariants.
    pub fn from_parts(months: Vec<NaiveDate>, columns: Vec<Column>) -> Result<Self, AppError> {
        if months.iter().any(|m| month_start(*m) != *m) {
            return Err(AppError::new(2, "Table index must hold first-of-month dates."));
        }
        if months.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AppError::new(2, "Table index must be strictly ascending."));
        }
        let mut table = Self { months, columns: Vec::with_capacity(columns.len()) };
        for col in columns {
            if col.values.len() != table.months.len() {
                return Err(AppError::new(
                    2,
                    format!(
                        "Column '{}' has {} values for {} rows.",
                        col.name,
                        col.values.len(),
                        table.months.len()
                    ),
                ));
            }
            if table.has_column(&col.name) {
                return Err(AppError::new(2, format!("Duplicate column '{}'.", col.name)));
            }
            table.columns.push(col);
        }
        Ok(table)
    }

    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// True when the table has no rows (it may still have columns).
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn value(&self, name: &str, month: NaiveDate) -> Option<f64> {
        let row = self.months.binary_search(&month_start(month)).ok()?;
        self.column(name).and_then(|c| c.values[row])
    }

    /// Insert a column, replacing an existing one of the same name in place.
    ///
    /// Returns the replaced values, if any.
    pub(crate) fn set_column(&mut self, name: &str, values: Vec<Option<f64>>) -> Option<Vec<Option<f64>>> {
        debug_assert_eq!(values.len(), self.months.len());
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => Some(std::mem::replace(&mut existing.values, values)),
            None => {
                self.columns.push(Column {
                    name: name.to_string(),
                    values,
                });
                None
            }
        }
    }

    pub(crate) fn with_index(months: Vec<NaiveDate>) -> Self {
        Self {
            months,
            columns: Vec::new(),
        }
    }

    /// Rows whose month falls inside `range` (inclusive), all columns kept.
    pub fn slice(&self, range: &MonthRange) -> WideTable {
        let lo = self.months.partition_point(|m| *m < range.start);
        let hi = self.months.partition_point(|m| *m <= range.end);
        let (lo, hi) = (lo.min(hi), hi);
        WideTable {
            months: self.months[lo..hi].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: c.values[lo..hi].to_vec(),
                })
                .collect(),
        }
    }
}
