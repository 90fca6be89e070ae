//! FRED API integration.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::data::gateway::FetchGateway;
use crate::domain::Observation;
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const API_KEY_VAR: &str = "FRED_API_KEY";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FredClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, AppError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AppError::new(2, "FRED API key is empty."));
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            base_url: BASE_URL.to_string(),
        })
    }

    /// Read `FRED_API_KEY` from the environment (a `.env` file is honored).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| AppError::new(2, "Missing FRED_API_KEY in environment (.env)."))?;
        Self::new(api_key)
    }

    /// Read the key from a plain text file (surrounding whitespace ignored).
    pub fn from_key_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(2, format!("Failed to read API key file '{}': {e}", path.display()))
        })?;
        Self::new(raw)
    }

    /// Point the client at a different observations endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl FetchGateway for FredClient {
    fn fetch(&self, source_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Observation>, AppError> {
        let (start, end) = (start.to_string(), end.to_string());
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("series_id", source_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
            ])
            .send()
            .map_err(|e| AppError::new(4, format!("FRED request for {source_id} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            // FRED explains 4xx responses in a small JSON body; surface it when present.
            let detail = resp
                .json::<ErrorResponse>()
                .ok()
                .and_then(|e| e.error_message)
                .unwrap_or_default();
            return Err(AppError::new(
                4,
                format!("FRED request for {source_id} failed with status {status}. {detail}")
                    .trim_end()
                    .to_string(),
            ));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse FRED response for {source_id}: {e}")))?;

        let observations = parse_observations(body.observations)?;
        debug!(series = source_id, n = observations.len(), "fetched observations");
        Ok(observations)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_message: Option<String>,
}

fn parse_observations(raw: Vec<RawObservation>) -> Result<Vec<Observation>, AppError> {
    raw.into_iter()
        .map(|obs| {
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
                .map_err(|e| AppError::new(4, format!("Invalid FRED date '{}': {e}", obs.date)))?;
            Ok(Observation::from_raw(date, &obs.value))
        })
        .collect()
}
