//! File-backed departures for development without network access.
//!
//! Reads a saved db-rest response from disk and serves it as if it were
//! live. Times in the file are used as they are, so a board recorded in
//! the past shows departures with negative countdowns.

use std::path::PathBuf;

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::debug;

use crate::domain::ModeOfTransport;
use crate::source::{AdapterError, SourceAdapter, SourceData};

use super::dbrest::{ConvertOptions, DeparturesResponse, convert_departures};

/// Which file to read and how to filter it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileParams {
    /// Path to an FPTF departures JSON file
    pub path: PathBuf,
    /// Maximum number of departures kept
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub include_modes: Vec<ModeOfTransport>,
    #[serde(default)]
    pub exclude_modes: Vec<ModeOfTransport>,
}

fn default_limit() -> usize {
    20
}

impl FileParams {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            limit: default_limit(),
            include_modes: Vec::new(),
            exclude_modes: Vec::new(),
        }
    }
}

/// Adapter serving departures from JSON files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAdapter;

impl FileAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Read and convert the file.
    pub async fn departures(&self, params: &FileParams) -> Result<SourceData, AdapterError> {
        let json = tokio::fs::read_to_string(&params.path).await?;

        let board: DeparturesResponse = serde_json::from_str(&json).map_err(|e| {
            AdapterError::malformed(
                format!("failed to parse {}: {e}", params.path.display()),
                Some(&json),
            )
        })?;

        let options = ConvertOptions {
            limit: params.limit,
            include_modes: params.include_modes.clone(),
            exclude_modes: params.exclude_modes.clone(),
        };
        let departures = convert_departures(&board.into_departures(), &options)
            .map_err(|e| AdapterError::malformed(e.to_string(), None))?;

        debug!(path = %params.path.display(), count = departures.len(), "loaded departures from file");
        Ok(SourceData::from_departures(departures))
    }
}

impl SourceAdapter for FileAdapter {
    type Params = FileParams;

    fn name(&self) -> &str {
        "file"
    }

    fn fetch<'a>(&'a self, params: &'a FileParams) -> BoxFuture<'a, Result<SourceData, AdapterError>> {
        Box::pin(self.departures(params))
    }
}
