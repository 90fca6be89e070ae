//! Two-indicator comparison views over an assembled table.
//!
//! Given a month range and two column names this produces:
//! - both raw series aligned on date
//! - their year-over-year percent change (12-row lag)
//! - the paired YoY points with the Pearson correlation between them
//!
//! Everything here is read-only over the table.

use chrono::NaiveDate;

use crate::domain::{MonthRange, WideTable};
use crate::error::AppError;

/// Rows between a month and the same month one year earlier.
pub const YOY_LAG: usize = 12;

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparedSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
    /// Percent change vs `YOY_LAG` rows earlier, after forward-filling.
    pub yoy: Vec<Option<f64>>,
}

/// A YoY scatter point where both sides are present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub month: NaiveDate,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub range: MonthRange,
    pub months: Vec<NaiveDate>,
    pub primary: ComparedSeries,
    pub secondary: ComparedSeries,
    pub scatter: Vec<ScatterPoint>,
    /// `None` with fewer than two scatter points or a constant side.
    pub correlation: Option<f64>,
}

/// Restrict the table to `range`; an empty result is a "no data" error.
pub fn slice_range(table: &WideTable, range: &MonthRange) -> Result<WideTable, AppError> {
    let sliced = table.slice(range);
    if sliced.is_empty() {
        return Err(AppError::no_data(format!("No data found for {range}.")));
    }
    Ok(sliced)
}

/// Build the comparison views for `primary` vs `secondary` over `range`.
pub fn compare(
    table: &WideTable,
    primary: &str,
    secondary: &str,
    range: &MonthRange,
) -> Result<Comparison, AppError> {
    for name in [primary, secondary] {
        if !table.has_column(name) {
            return Err(AppError::new(
                2,
                format!(
                    "Unknown indicator '{name}'. Available: {}",
                    table.column_names().join(", ")
                ),
            ));
        }
    }

    let sliced = slice_range(table, range)?;
    let primary = compared_series(&sliced, primary)?;
    let secondary = compared_series(&sliced, secondary)?;

    let scatter: Vec<ScatterPoint> = sliced
        .months()
        .iter()
        .zip(primary.yoy.iter().zip(&secondary.yoy))
        .filter_map(|(month, pair)| match pair {
            (Some(x), Some(y)) => Some(ScatterPoint {
                month: *month,
                x: *x,
                y: *y,
            }),
            _ => None,
        })
        .collect();

    let correlation = pearson(&scatter.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>());

    Ok(Comparison {
        range: *range,
        months: sliced.months().to_vec(),
        primary,
        secondary,
        scatter,
        correlation,
    })
}

fn compared_series(table: &WideTable, name: &str) -> Result<ComparedSeries, AppError> {
    let column = table
        .column(name)
        .ok_or_else(|| AppError::new(2, format!("Unknown indicator '{name}'.")))?;
    let yoy = yoy_percent(&forward_fill(&column.values), YOY_LAG);
    Ok(ComparedSeries {
        name: name.to_string(),
        values: column.values.clone(),
        yoy,
    })
}

/// Carry the last present value forward over absent cells.
pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}

/// Percent change vs `lag` rows earlier, in percent.
///
/// Absent when either value is absent or the base is zero.
pub fn yoy_percent(values: &[Option<f64>], lag: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let base = i.checked_sub(lag).and_then(|j| values[j])?;
            let cur = values[i]?;
            if base == 0.0 {
                return None;
            }
            Some((cur / base - 1.0) * 100.0).filter(|v| v.is_finite())
        })
        .collect()
}

/// Sample Pearson correlation of paired values.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then_some(r.clamp(-1.0, 1.0))
}
