//! db-rest HTTP client.

use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::debug;

use crate::domain::ModeOfTransport;
use crate::source::{AdapterError, SourceAdapter, SourceData};

use crate::adapters::http_client;

use super::convert::{ConvertOptions, convert_departures};
use super::types::DeparturesResponse;

/// One way of asking a db-rest server for a station's departures.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DbRestParams {
    /// Server base URL, e.g. `https://v6.db.transport.rest`
    pub server_url: String,
    /// Station id (IBNR)
    pub station_id: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum number of departures kept
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Look-ahead window in minutes
    #[serde(default = "default_duration_mins")]
    pub duration_mins: u32,
    /// Language of remarks
    #[serde(default = "default_language")]
    pub language: String,
    /// Keep only these modes (empty keeps all)
    #[serde(default)]
    pub include_modes: Vec<ModeOfTransport>,
    /// Drop these modes
    #[serde(default)]
    pub exclude_modes: Vec<ModeOfTransport>,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_limit() -> usize {
    20
}

fn default_duration_mins() -> u32 {
    120
}

fn default_language() -> String {
    "de".to_string()
}

impl DbRestParams {
    /// Parameters for one server and station with default settings.
    pub fn new(server_url: impl Into<String>, station_id: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            station_id: station_id.into(),
            timeout_secs: default_timeout_secs(),
            limit: default_limit(),
            duration_mins: default_duration_mins(),
            language: default_language(),
            include_modes: Vec::new(),
            exclude_modes: Vec::new(),
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the maximum number of departures.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the look-ahead window.
    pub fn with_duration(mut self, mins: u32) -> Self {
        self.duration_mins = mins;
        self
    }

    /// Set included and excluded modes.
    pub fn with_modes(
        mut self,
        include: Vec<ModeOfTransport>,
        exclude: Vec<ModeOfTransport>,
    ) -> Self {
        self.include_modes = include;
        self.exclude_modes = exclude;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/stations/{}/departures",
            self.server_url.trim_end_matches('/'),
            self.station_id
        )
    }

    fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            limit: self.limit,
            include_modes: self.include_modes.clone(),
            exclude_modes: self.exclude_modes.clone(),
        }
    }
}

/// Adapter for db-rest servers.
///
/// Holds only a shared HTTP client; everything request-specific lives in
/// [`DbRestParams`].
#[derive(Debug, Clone)]
pub struct DbRestAdapter {
    http: reqwest::Client,
}

impl DbRestAdapter {
    /// Create an adapter with its own HTTP client.
    pub fn new() -> Result<Self, AdapterError> {
        Ok(Self {
            http: http_client()?,
        })
    }

    /// Create an adapter sharing an existing HTTP client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch and convert a station's departures.
    pub async fn departures(&self, params: &DbRestParams) -> Result<SourceData, AdapterError> {
        let response = self
            .http
            .get(params.url())
            .query(&[
                ("duration", params.duration_mins.to_string()),
                ("language", params.language.clone()),
            ])
            .timeout(Duration::from_secs(params.timeout_secs))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let board: DeparturesResponse = serde_json::from_str(&body)
            .map_err(|e| AdapterError::malformed(e.to_string(), Some(&body)))?;

        let departures = convert_departures(&board.into_departures(), &params.convert_options())
            .map_err(|e| AdapterError::malformed(e.to_string(), Some(&body)))?;

        debug!(
            station = %params.station_id,
            count = departures.len(),
            "fetched db-rest departures"
        );

        Ok(SourceData::from_departures(departures))
    }
}

impl SourceAdapter for DbRestAdapter {
    type Params = DbRestParams;

    fn name(&self) -> &str {
        "db-rest"
    }

    fn fetch<'a>(
        &'a self,
        params: &'a DbRestParams,
    ) -> BoxFuture<'a, Result<SourceData, AdapterError>> {
        Box::pin(self.departures(params))
    }
}
