//! Read/write the wide table as CSV.
//!
//! Layout: a `date` column holding first-of-month ISO dates, then one column
//! per indicator. Absent values are empty fields. This file is the durable
//! artifact consumed by `econ compare` and by downstream tools.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{Column, WideTable, coerce_value, month_start};
use crate::error::AppError;

const DATE_HEADER: &str = "date";

/// Write the table to `path`, creating parent directories as needed.
pub fn write_table_csv(path: &Path, table: &WideTable) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::new(2, format!("Failed to create directory '{}': {e}", parent.display()))
        })?;
    }
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
    write_table(file, table)
        .map_err(|e| AppError::new(2, format!("Failed to write CSV '{}': {e}", path.display())))
}

/// Write the table to any writer.
pub fn write_table<W: Write>(writer: W, table: &WideTable) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_writer(writer);

    let mut header = vec![DATE_HEADER];
    header.extend(table.column_names());
    w.write_record(&header)?;

    for (row, month) in table.months().iter().enumerate() {
        let mut record = Vec::with_capacity(table.columns().len() + 1);
        record.push(month.format("%Y-%m-%d").to_string());
        for col in table.columns() {
            record.push(col.values[row].map(|v| v.to_string()).unwrap_or_default());
        }
        w.write_record(&record)?;
    }

    w.flush()?;
    Ok(())
}

/// Load a table previously written by `write_table_csv`.
pub fn read_table_csv(path: &Path) -> Result<WideTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_table(file)
}

/// Parse a table from any reader.
///
/// The first column is the date index regardless of its header name (pandas
/// exports write an empty header there). Dates are snapped to first-of-month
/// and rows are sorted; unparseable value cells become absent.
pub fn read_table<R: Read>(reader: R) -> Result<WideTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    if headers.is_empty() {
        return Err(AppError::new(2, "CSV has no header row."));
    }
    let names: Vec<String> = headers.iter().skip(1).map(normalize_header_name).collect();

    let mut rows: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based line numbers plus the header line.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(2, format!("CSV parse error on line {line}: {e}")))?;
        let (month, values) = parse_row(&record, names.len())
            .map_err(|msg| AppError::new(2, format!("Line {line}: {msg}")))?;
        rows.push((month, values));
    }

    rows.sort_by_key(|(m, _)| *m);
    // Duplicate months: the later row wins, as with any other last-write merge.
    let mut deduped: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::with_capacity(rows.len());
    for row in rows {
        match deduped.last_mut() {
            Some(last) if last.0 == row.0 => *last = row,
            _ => deduped.push(row),
        }
    }

    let months: Vec<NaiveDate> = deduped.iter().map(|(m, _)| *m).collect();
    let columns = names
        .into_iter()
        .enumerate()
        .map(|(c, name)| Column {
            name,
            values: deduped.iter().map(|(_, v)| v[c]).collect(),
        })
        .collect();

    WideTable::from_parts(months, columns)
}

fn parse_row(record: &StringRecord, n_columns: usize) -> Result<(NaiveDate, Vec<Option<f64>>), String> {
    let raw_date = record.get(0).unwrap_or_default();
    let date = parse_date(raw_date).ok_or_else(|| format!("invalid date '{raw_date}'"))?;
    let values = (0..n_columns)
        .map(|c| record.get(c + 1).and_then(coerce_value))
        .collect();
    Ok((month_start(date), values))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    // Accept plain dates and pandas-style timestamps ("2024-01-01 00:00:00").
    let head = raw.split_whitespace().next()?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet tools sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}
