//! Command-line parsing for the FRED monthly dataset builder.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "econ", version, about = "Monthly economic indicator table builder (FRED-based)")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every registered series, build the monthly table, and write it out.
    Fetch(FetchArgs),
    /// Compare two indicators from a saved table (values, YoY %, correlation).
    Compare(CompareArgs),
    /// List the registered series and derived columns.
    Series,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// First observation date (YYYY-MM-DD).
    #[arg(long, default_value = "2000-01-01", value_parser = parse_date)]
    pub start: NaiveDate,

    /// Last observation date (YYYY-MM-DD); defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Output CSV path. Repeat to write the same table to several places.
    #[arg(short, long = "out", value_name = "CSV", required = true)]
    pub outputs: Vec<PathBuf>,

    /// Read the FRED API key from this file instead of `FRED_API_KEY`.
    #[arg(long, value_name = "FILE")]
    pub api_key_file: Option<PathBuf>,

    /// Fetch series concurrently (output order is unaffected).
    #[arg(long)]
    pub parallel: bool,

    /// Skip writing the `.meta.json` sidecar next to each output.
    #[arg(long)]
    pub no_meta: bool,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    /// Table CSV produced by `econ fetch`.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Primary indicator (column name).
    pub primary: String,

    /// Secondary indicator (column name).
    pub secondary: String,

    /// First month to include (YYYY-MM-DD); defaults to the first row.
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last month to include (YYYY-MM-DD); defaults to the last row.
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Also write the sliced table to this CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| format!("invalid date '{raw}': {e}"))
}
