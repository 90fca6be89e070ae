//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline and comparison code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::DatasetSnapshot;
use crate::compare::Comparison;
use crate::data::SeriesRegistry;
use crate::domain::WideTable;

/// Summary of a refresh run: range, shape, and anything that was skipped.
pub fn format_refresh_summary(snapshot: &DatasetSnapshot) -> String {
    let mut out = String::new();
    let table = &snapshot.table;

    out.push_str("=== econ - FRED monthly refresh ===\n");
    out.push_str(&format!("Refreshed: {}\n", snapshot.refreshed_at.to_rfc3339()));
    out.push_str(&format!("Range: {}\n", snapshot.range));
    out.push_str(&format!(
        "Table: {} rows x {} columns\n",
        table.len(),
        table.columns().len()
    ));
    if let (Some(first), Some(last)) = (table.months().first(), table.months().last()) {
        out.push_str(&format!("Index: {first} .. {last}\n"));
    }

    if snapshot.skipped.is_empty() {
        out.push_str("Skipped: none\n");
    } else {
        out.push_str(&format!("Skipped ({}):\n", snapshot.skipped.len()));
        for s in &snapshot.skipped {
            out.push_str(&format!("  - {} ({}): {}\n", s.name, s.source_id, s.reason));
        }
    }
    if !snapshot.skipped_derived.is_empty() {
        out.push_str(&format!(
            "Derived not computed: {}\n",
            snapshot.skipped_derived.join(", ")
        ));
    }
    if snapshot.is_empty() {
        out.push_str("No series returned data; the table has headers only.\n");
    }

    out
}

/// Per-column coverage (non-absent cells) for a table.
pub fn format_coverage(table: &WideTable) -> String {
    let mut out = String::new();
    let width = table
        .columns()
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0)
        .max(9);

    out.push_str(&format!("{:<width$}  {:>7}  {:>7}\n", "indicator", "present", "latest"));
    for col in table.columns() {
        let present = col.values.iter().filter(|v| v.is_some()).count();
        let latest = col
            .values
            .iter()
            .rev()
            .find_map(|v| *v)
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<width$}  {:>7}  {:>7}\n",
            col.name, present, latest
        ));
    }
    out
}

/// The registry as a table: name, FRED id, frequency, monthly rule.
pub fn format_registry(registry: &SeriesRegistry) -> String {
    let mut out = String::new();
    let width = registry
        .all_specs()
        .iter()
        .map(|s| s.display_name.len())
        .max()
        .unwrap_or(0);

    for spec in registry.all_specs() {
        out.push_str(&format!(
            "{:<width$}  {:<16}  {}  {}\n",
            spec.display_name,
            spec.source_id,
            spec.frequency,
            spec.frequency.aggregation_label()
        ));
    }
    if !registry.derived().is_empty() {
        out.push_str("\nDerived:\n");
        for d in registry.derived() {
            out.push_str(&format!("{} = {} / {}\n", d.name, d.numerator, d.denominator));
        }
    }
    out
}

/// Comparison report: aligned values, YoY, and the correlation.
pub fn format_comparison(c: &Comparison) -> String {
    let mut out = String::new();
    let (a, b) = (&c.primary.name, &c.secondary.name);

    out.push_str(&format!("=== {a} vs {b} ({}) ===\n", c.range));
    out.push_str(&format!(
        "{:<10}  {:>14}  {:>14}  {:>10}  {:>10}\n",
        "month", trunc(a, 14), trunc(b, 14), "yoy % (1)", "yoy % (2)"
    ));
    for (i, month) in c.months.iter().enumerate() {
        out.push_str(&format!(
            "{:<10}  {:>14}  {:>14}  {:>10}  {:>10}\n",
            month.format("%Y-%m").to_string(),
            fmt_opt(c.primary.values[i], 3),
            fmt_opt(c.secondary.values[i], 3),
            fmt_opt(c.primary.yoy[i], 2),
            fmt_opt(c.secondary.yoy[i], 2),
        ));
    }

    out.push_str(&format!("\nYoY scatter points: {}\n", c.scatter.len()));
    match c.correlation {
        Some(r) => out.push_str(&format!("Correlation (YoY): {r:.2}\n")),
        None => out.push_str("Correlation (YoY): n/a\n"),
    }
    out
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    v.map(|v| format!("{v:.decimals$}")).unwrap_or_else(|| "-".to_string())
}

fn trunc(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}
