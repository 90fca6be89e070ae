//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - built from FRED responses or from a persisted CSV
//! - passed between the normalizer, the assembler, and the comparison views
//! - serialized into the metadata sidecar

use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Native sampling cadence of a source series.
///
/// Serialized with FRED's single-letter frequency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "D")]
    Daily,
    #[serde(rename = "W")]
    Weekly,
    #[serde(rename = "M")]
    Monthly,
    #[serde(rename = "Q")]
    Quarterly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Frequency::Daily => "D",
            Frequency::Weekly => "W",
            Frequency::Monthly => "M",
            Frequency::Quarterly => "Q",
        }
    }

    /// Short description of the monthly aggregation applied to this cadence.
    pub fn aggregation_label(self) -> &'static str {
        match self {
            Frequency::Daily => "monthly mean",
            Frequency::Weekly => "monthly sum",
            Frequency::Monthly => "as reported",
            Frequency::Quarterly => "forward-filled",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One registry entry: what we call the indicator and where it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub display_name: String,
    pub source_id: String,
    pub frequency: Frequency,
}

impl SeriesSpec {
    pub fn new(display_name: impl Into<String>, source_id: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            display_name: display_name.into(),
            source_id: source_id.into(),
            frequency,
        }
    }
}

/// A ratio column computed from two existing columns after assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedSpec {
    pub name: String,
    pub numerator: String,
    pub denominator: String,
}

impl DerivedSpec {
    pub fn new(name: impl Into<String>, numerator: impl Into<String>, denominator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            numerator: numerator.into(),
            denominator: denominator.into(),
        }
    }
}

/// One raw data point as reported by the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    /// `None` when the source reported a missing marker or a non-numeric value.
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }

    /// Build an observation from the raw string value a source reports.
    pub fn from_raw(date: NaiveDate, raw: &str) -> Self {
        Self {
            date,
            value: coerce_value(raw),
        }
    }
}

/// Coerce a raw cell into a number.
///
/// FRED reports missing values as `"."`; anything that does not parse to a
/// finite number is treated the same way.
pub fn coerce_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// First day of the following month.
pub fn next_month(month: NaiveDate) -> Option<NaiveDate> {
    month_start(month).checked_add_months(Months::new(1))
}

/// First day of the last month in the calendar quarter containing `date`.
pub fn quarter_last_month(date: NaiveDate) -> NaiveDate {
    let start = month_start(date);
    let remaining = 2 - (start.month0() % 3);
    start.checked_add_months(Months::new(remaining)).unwrap_or(start)
}

/// Every first-of-month date from `start` to `end` inclusive.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let end = month_start(end);
    let mut out = Vec::new();
    let mut cur = Some(month_start(start));
    while let Some(m) = cur {
        if m > end {
            break;
        }
        out.push(m);
        cur = next_month(m);
    }
    out
}

/// Inclusive month range, both ends normalized to first-of-month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        let (start, end) = (month_start(start), month_start(end));
        if start > end {
            return Err(AppError::new(
                2,
                format!("Start ({start}) must not be after end ({end})."),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, month: NaiveDate) -> bool {
        let m = month_start(month);
        m >= self.start && m <= self.end
    }

    pub fn months(&self) -> Vec<NaiveDate> {
        months_between(self.start, self.end)
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.format("%Y-%m"), self.end.format("%Y-%m"))
    }
}

/// One month of a normalized series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthPoint {
    /// Always the first day of the month.
    pub month: NaiveDate,
    pub value: Option<f64>,
}

/// A gap-free monthly series.
///
/// Months are strictly ascending, each appears once, and every month between
/// the first and last entry is present (absent values are explicit `None`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    points: Vec<MonthPoint>,
}

impl MonthlySeries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a series from arbitrary `(date, value)` pairs.
    ///
    /// Dates are snapped to first-of-month; when several pairs land in the same
    /// month the last one (in input order) wins. Missing months between the
    /// first and last key are filled with `None`.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let mut keyed: Vec<(NaiveDate, Option<f64>)> = pairs
            .into_iter()
            .map(|(d, v)| (month_start(d), v))
            .collect();
        // Stable sort keeps input order within a month so "last" is well-defined.
        keyed.sort_by_key(|(m, _)| *m);

        let mut points: Vec<MonthPoint> = Vec::with_capacity(keyed.len());
        for (month, value) in keyed {
            match points.last_mut() {
                Some(last) if last.month == month => last.value = value,
                _ => points.push(MonthPoint { month, value }),
            }
        }

        let mut series = Self { points };
        series.fill_gaps();
        series
    }

    /// Build a contiguous series starting at `start`.
    pub fn from_values(start: NaiveDate, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let mut points = Vec::new();
        let mut cur = Some(month_start(start));
        for value in values {
            let Some(month) = cur else { break };
            points.push(MonthPoint { month, value });
            cur = next_month(month);
        }
        Self { points }
    }

    pub fn points(&self) -> &[MonthPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True if at least one month carries a value.
    pub fn has_data(&self) -> bool {
        self.points.iter().any(|p| p.value.is_some())
    }

    pub fn first_month(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.month)
    }

    pub fn last_month(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.month)
    }

    pub fn months(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.month)
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Value for `month`, `None` if the month is outside the series or absent.
    pub fn value_at(&self, month: NaiveDate) -> Option<f64> {
        let month = month_start(month);
        self.points
            .binary_search_by_key(&month, |p| p.month)
            .ok()
            .and_then(|idx| self.points[idx].value)
    }

    /// Drop months outside `range`. The result stays gap-free.
    pub fn clip_to(&mut self, range: &MonthRange) {
        self.points.retain(|p| range.contains(p.month));
    }

    /// Extend the series with absent months so it covers `range`.
    ///
    /// Existing values are never altered. An empty series stays empty.
    pub fn pad_to(&mut self, range: &MonthRange) {
        let (Some(first), Some(last)) = (self.first_month(), self.last_month()) else {
            return;
        };
        if range.start < first {
            let mut head: Vec<MonthPoint> = months_between(range.start, first)
                .into_iter()
                .filter(|m| *m < first)
                .map(|month| MonthPoint { month, value: None })
                .collect();
            head.append(&mut self.points);
            self.points = head;
        }
        if range.end > last {
            self.points.extend(
                months_between(last, range.end)
                    .into_iter()
                    .filter(|m| *m > last)
                    .map(|month| MonthPoint { month, value: None }),
            );
        }
    }

    fn fill_gaps(&mut self) {
        let (Some(first), Some(last)) = (self.first_month(), self.last_month()) else {
            return;
        };
        let span = months_between(first, last);
        if span.len() == self.points.len() {
            return;
        }
        let mut filled = Vec::with_capacity(span.len());
        let mut it = self.points.iter().peekable();
        for month in span {
            match it.peek() {
                Some(p) if p.month == month => {
                    filled.push(**p);
                    it.next();
                }
                _ => filled.push(MonthPoint { month, value: None }),
            }
        }
        self.points = filled;
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub range: MonthRange,
    /// Raw observation window passed to the gateway (day precision).
    pub observation_start: NaiveDate,
    pub observation_end: NaiveDate,
    /// Fetch series concurrently; output order still follows the registry.
    pub parallel: bool,
}

impl FetchConfig {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        let range = MonthRange::new(start, end)?;
        Ok(Self {
            range,
            observation_start: start,
            observation_end: end,
            parallel: false,
        })
    }
}
