//! End-to-end refresh runs against an in-memory gateway.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use econ_panel::app::pipeline::run_refresh;
use econ_panel::data::{FetchGateway, SeriesRegistry};
use econ_panel::domain::{DerivedSpec, FetchConfig, Frequency, Observation, SeriesSpec};
use econ_panel::error::AppError;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Serves canned observations by source id; unknown ids are "unavailable".
#[derive(Default)]
struct MockGateway {
    series: HashMap<String, Vec<Observation>>,
    calls: Mutex<Vec<String>>,
}

impl MockGateway {
    fn with(mut self, id: &str, obs: Vec<(NaiveDate, &str)>) -> Self {
        self.series.insert(
            id.to_string(),
            obs.into_iter().map(|(date, raw)| Observation::from_raw(date, raw)).collect(),
        );
        self
    }
}

impl FetchGateway for MockGateway {
    fn fetch(&self, source_id: &str, _start: NaiveDate, _end: NaiveDate) -> Result<Vec<Observation>, AppError> {
        self.calls.lock().unwrap().push(source_id.to_string());
        self.series
            .get(source_id)
            .cloned()
            .ok_or_else(|| AppError::new(4, format!("FRED request for {source_id} failed with status 400.")))
    }
}

fn gdp_cpi_gateway() -> MockGateway {
    MockGateway::default()
        .with("GDPC1", vec![(d(2024, 1, 1), "100"), (d(2024, 4, 1), "110")])
        .with(
            "CPIAUCSL",
            vec![
                (d(2024, 1, 1), "1.0"),
                (d(2024, 2, 1), "1.02"),
                (d(2024, 3, 1), "1.04"),
                (d(2024, 4, 1), "1.06"),
                (d(2024, 5, 1), "1.08"),
                (d(2024, 6, 1), "1.1"),
            ],
        )
}

fn gdp_cpi_registry() -> SeriesRegistry {
    SeriesRegistry::new(vec![
        SeriesSpec::new("GDP", "GDPC1", Frequency::Quarterly),
        SeriesSpec::new("CPI", "CPIAUCSL", Frequency::Monthly),
    ])
    .unwrap()
}

#[test]
fn quarterly_and_monthly_merge_into_six_rows() {
    let gateway = gdp_cpi_gateway();
    let config = FetchConfig::new(d(2024, 1, 1), d(2024, 6, 30)).unwrap();
    let snapshot = run_refresh(&gateway, &gdp_cpi_registry(), &config).unwrap();
    let table = &snapshot.table;

    assert_eq!(table.len(), 6);
    assert_eq!(table.column_names(), vec!["GDP", "CPI"]);
    assert_eq!(
        table.column("GDP").unwrap().values,
        vec![Some(100.0), Some(100.0), Some(100.0), Some(110.0), Some(110.0), Some(110.0)]
    );
    assert_eq!(
        table.column("CPI").unwrap().values,
        vec![Some(1.0), Some(1.02), Some(1.04), Some(1.06), Some(1.08), Some(1.1)]
    );
    assert!(snapshot.skipped.is_empty());
}

#[test]
fn unavailable_series_is_skipped_not_fatal() {
    let gateway = gdp_cpi_gateway();
    let registry = SeriesRegistry::new(vec![
        SeriesSpec::new("GDP", "GDPC1", Frequency::Quarterly),
        SeriesSpec::new("Oil Prices", "DCOILWTICO", Frequency::Daily),
        SeriesSpec::new("CPI", "CPIAUCSL", Frequency::Monthly),
    ])
    .unwrap();
    let config = FetchConfig::new(d(2024, 1, 1), d(2024, 6, 30)).unwrap();
    let snapshot = run_refresh(&gateway, &registry, &config).unwrap();

    assert_eq!(snapshot.table.column_names(), vec!["GDP", "CPI"]);
    assert_eq!(snapshot.skipped.len(), 1);
    assert_eq!(snapshot.skipped[0].source_id, "DCOILWTICO");
    assert_eq!(gateway.calls.lock().unwrap().len(), 3);
}

#[test]
fn marker_only_series_is_kept_as_absent_column() {
    let gateway = gdp_cpi_gateway().with("ICSA", vec![(d(2024, 1, 6), "."), (d(2024, 1, 13), ".")]);
    let registry = SeriesRegistry::new(vec![
        SeriesSpec::new("CPI", "CPIAUCSL", Frequency::Monthly),
        SeriesSpec::new("Initial Jobless Claims", "ICSA", Frequency::Weekly),
    ])
    .unwrap();
    let config = FetchConfig::new(d(2024, 1, 1), d(2024, 6, 30)).unwrap();
    let snapshot = run_refresh(&gateway, &registry, &config).unwrap();

    assert_eq!(snapshot.table.column_names(), vec!["CPI", "Initial Jobless Claims"]);
    assert_eq!(snapshot.table.column("Initial Jobless Claims").unwrap().values, vec![None; 6]);
    assert!(snapshot.skipped.is_empty());
}

#[test]
fn marker_only_series_feed_derived_columns_as_absent() {
    let gateway = gdp_cpi_gateway().with("RSGCS", vec![(d(2024, 1, 1), "."), (d(2024, 2, 1), ".")]);
    let registry = SeriesRegistry::new(vec![
        SeriesSpec::new("Grocery Sales", "RSGCS", Frequency::Monthly),
        SeriesSpec::new("CPI", "CPIAUCSL", Frequency::Monthly),
    ])
    .unwrap()
    .with_derived(vec![DerivedSpec::new("Grocery Units", "Grocery Sales", "CPI")])
    .unwrap();
    let config = FetchConfig::new(d(2024, 1, 1), d(2024, 6, 30)).unwrap();
    let snapshot = run_refresh(&gateway, &registry, &config).unwrap();

    assert!(snapshot.skipped_derived.is_empty());
    assert_eq!(snapshot.table.column("Grocery Units").unwrap().values, vec![None; 6]);
}

#[test]
fn only_marker_series_yield_empty_table_without_skips() {
    let gateway = MockGateway::default()
        .with("A1", vec![(d(2024, 1, 1), "."), (d(2024, 2, 1), ".")])
        .with("B1", vec![(d(2024, 1, 1), "."), (d(2024, 3, 1), ".")]);
    let registry = SeriesRegistry::new(vec![
        SeriesSpec::new("A", "A1", Frequency::Monthly),
        SeriesSpec::new("B", "B1", Frequency::Monthly),
    ])
    .unwrap();
    let config = FetchConfig::new(d(2024, 1, 1), d(2024, 3, 31)).unwrap();
    let snapshot = run_refresh(&gateway, &registry, &config).unwrap();

    assert!(snapshot.is_empty());
    assert_eq!(snapshot.table.column_names(), vec!["A", "B"]);
    assert!(snapshot.skipped.is_empty());
}

#[test]
fn nothing_fetched_yields_empty_table_with_intended_columns() {
    let gateway = MockGateway::default();
    let registry = gdp_cpi_registry()
        .with_derived(vec![DerivedSpec::new("Real", "GDP", "CPI")])
        .unwrap();
    let config = FetchConfig::new(d(2024, 1, 1), d(2024, 6, 30)).unwrap();
    let snapshot = run_refresh(&gateway, &registry, &config).unwrap();

    assert!(snapshot.is_empty());
    assert_eq!(snapshot.table.column_names(), vec!["GDP", "CPI", "Real"]);
    assert_eq!(snapshot.skipped.len(), 2);
}

#[test]
fn derived_columns_follow_registry_order() {
    let gateway = MockGateway::default()
        .with("RSGCS", vec![(d(2024, 1, 1), "100"), (d(2024, 2, 1), "120")])
        .with("CUSR0000SAF11", vec![(d(2024, 1, 1), "2"), (d(2024, 2, 1), "0")])
        .with("POPTHM", vec![(d(2024, 1, 1), "10"), (d(2024, 2, 1), "10")]);
    let registry = SeriesRegistry::new(vec![
        SeriesSpec::new("Grocery Sales", "RSGCS", Frequency::Monthly),
        SeriesSpec::new("CPI (Food at Home)", "CUSR0000SAF11", Frequency::Monthly),
        SeriesSpec::new("US Population", "POPTHM", Frequency::Monthly),
    ])
    .unwrap()
    .with_derived(vec![
        DerivedSpec::new("Grocery Units", "Grocery Sales", "CPI (Food at Home)"),
        DerivedSpec::new("Grocery Units per Capita", "Grocery Units", "US Population"),
        DerivedSpec::new("Restaurant Units", "Restaurant Sales", "CPI (Food away from Home)"),
    ])
    .unwrap();
    let config = FetchConfig::new(d(2024, 1, 1), d(2024, 2, 29)).unwrap();
    let snapshot = run_refresh(&gateway, &registry, &config).unwrap();
    let table = &snapshot.table;

    assert_eq!(table.column("Grocery Units").unwrap().values, vec![Some(50.0), None]);
    assert_eq!(table.column("Grocery Units per Capita").unwrap().values, vec![Some(5.0), None]);
    assert_eq!(snapshot.skipped_derived, vec!["Restaurant Units".to_string()]);
}

#[test]
fn parallel_fetch_matches_sequential() {
    let gateway = gdp_cpi_gateway().with(
        "DCOILWTICO",
        vec![(d(2024, 1, 2), "70"), (d(2024, 1, 3), "72"), (d(2024, 3, 1), "80")],
    );
    let registry = SeriesRegistry::new(vec![
        SeriesSpec::new("Oil Prices", "DCOILWTICO", Frequency::Daily),
        SeriesSpec::new("GDP", "GDPC1", Frequency::Quarterly),
        SeriesSpec::new("CPI", "CPIAUCSL", Frequency::Monthly),
    ])
    .unwrap();

    let mut config = FetchConfig::new(d(2024, 1, 1), d(2024, 6, 30)).unwrap();
    let sequential = run_refresh(&gateway, &registry, &config).unwrap();
    config.parallel = true;
    let parallel = run_refresh(&gateway, &registry, &config).unwrap();

    assert_eq!(sequential.table, parallel.table);
    assert_eq!(parallel.table.column_names(), vec!["Oil Prices", "GDP", "CPI"]);
    assert_eq!(parallel.table.column("Oil Prices").unwrap().values[0], Some(71.0));
}

#[test]
fn range_padding_covers_requested_months() {
    let gateway = MockGateway::default().with("UNRATE", vec![(d(2024, 3, 1), "3.9")]);
    let registry =
        SeriesRegistry::new(vec![SeriesSpec::new("Unemployment Rate", "UNRATE", Frequency::Monthly)]).unwrap();
    let config = FetchConfig::new(d(2024, 1, 1), d(2024, 4, 15)).unwrap();
    let snapshot = run_refresh(&gateway, &registry, &config).unwrap();

    assert_eq!(snapshot.table.months().first(), Some(&d(2024, 1, 1)));
    assert_eq!(snapshot.table.months().last(), Some(&d(2024, 4, 1)));
    assert_eq!(
        snapshot.table.column("Unemployment Rate").unwrap().values,
        vec![None, None, Some(3.9), None]
    );
}

#[test]
fn quarterly_fill_does_not_add_rows_past_requested_end() {
    let gateway = gdp_cpi_gateway();
    let config = FetchConfig::new(d(2024, 1, 1), d(2024, 4, 15)).unwrap();
    let snapshot = run_refresh(&gateway, &gdp_cpi_registry(), &config).unwrap();

    assert_eq!(snapshot.table.len(), 4);
    assert_eq!(snapshot.table.months().last(), Some(&d(2024, 4, 1)));
    assert_eq!(snapshot.table.column("GDP").unwrap().values[3], Some(110.0));
}

#[test]
fn empty_registry_is_rejected() {
    let registry = SeriesRegistry::new(vec![]).unwrap();
    let config = FetchConfig::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
    let err = run_refresh(&MockGateway::default(), &registry, &config).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
