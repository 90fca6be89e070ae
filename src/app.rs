//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - fetches FRED data and builds the monthly table
//! - writes the table to every requested destination
//! - prints comparison reports from a saved table

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, CompareArgs, FetchArgs};
use crate::data::{FredClient, SeriesRegistry};
use crate::domain::{FetchConfig, MonthRange};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `econ` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Compare(args) => handle_compare(args),
        Command::Series => {
            print!("{}", crate::report::format_registry(&SeriesRegistry::builtin()));
            Ok(())
        }
    }
}

/// Install a stderr `fmt` subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn fetch_config_from_args(args: &FetchArgs) -> Result<FetchConfig, AppError> {
    let end = args.end.unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut config = FetchConfig::new(args.start, end)?;
    config.parallel = args.parallel;
    Ok(config)
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = fetch_config_from_args(&args)?;
    let client = match &args.api_key_file {
        Some(path) => FredClient::from_key_file(path)?,
        None => FredClient::from_env()?,
    };
    let registry = SeriesRegistry::builtin();

    let snapshot = pipeline::run_refresh(&client, &registry, &config)?;
    if snapshot.is_empty() {
        warn!("no valid data retrieved; writing header-only table");
    }

    for path in &args.outputs {
        crate::io::write_table_csv(path, &snapshot.table)?;
        if !args.no_meta {
            let meta = crate::io::TableMeta::from_snapshot(&snapshot, &registry);
            crate::io::write_meta_json(&crate::io::meta_path(path), &meta)?;
        }
        info!(path = %path.display(), "wrote table");
    }

    println!("{}", crate::report::format_refresh_summary(&snapshot));
    print!("{}", crate::report::format_coverage(&snapshot.table));
    Ok(())
}

fn handle_compare(args: CompareArgs) -> Result<(), AppError> {
    let table = crate::io::read_table_csv(&args.input)?;
    let (Some(first), Some(last)) = (table.months().first(), table.months().last()) else {
        return Err(AppError::no_data(format!(
            "Table '{}' has no rows.",
            args.input.display()
        )));
    };

    let range = MonthRange::new(args.start.unwrap_or(*first), args.end.unwrap_or(*last))?;
    let comparison = crate::compare::compare(&table, &args.primary, &args.secondary, &range)?;
    println!("{}", crate::report::format_comparison(&comparison));

    if let Some(path) = &args.export {
        let sliced = crate::compare::slice_range(&table, &range)?;
        crate::io::write_table_csv(path, &sliced)?;
        info!(path = %path.display(), rows = sliced.len(), "exported slice");
    }
    Ok(())
}
