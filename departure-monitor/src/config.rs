//! Process configuration.
//!
//! The monitor is configured from one JSON file, located through the
//! `DEPMON_CONFIG` environment variable (default `depmon.json`):
//!
//! ```json
//! {
//!     "timezone": "Europe/Berlin",
//!     "lines": 4,
//!     "refresh_secs": 30,
//!     "engine": {"place_names": ["Essen "]},
//!     "sources": [
//!         {
//!             "name": "db",
//!             "abort_all_on_failure": true,
//!             "fallbacks": [
//!                 {"adapter": "db_rest", "params": [
//!                     {"server_url": "https://v6.db.transport.rest", "station_id": "8000098"}
//!                 ]}
//!             ]
//!         }
//!     ]
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::adapters::dbrest::{DbRestAdapter, DbRestParams};
use crate::adapters::file::{FileAdapter, FileParams};
use crate::adapters::http_client;
use crate::adapters::messages::{MessageServerAdapter, MessageServerParams};
use crate::engine::EngineConfig;
use crate::source::{AdapterError, SourcePath};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "DEPMON_CONFIG";

/// Config file used when [`CONFIG_ENV`] is not set.
pub const DEFAULT_CONFIG_PATH: &str = "depmon.json";

/// Errors loading or applying the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Config file is not valid JSON for this schema
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    /// Config parsed but makes no sense
    #[error("invalid config: {0}")]
    Invalid(String),

    /// An adapter could not be created
    #[error("failed to create adapter: {0}")]
    Adapter(#[from] AdapterError),
}

/// The whole configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Timezone countdowns are measured in
    #[serde(default = "default_timezone")]
    pub timezone: Tz,

    /// Display rows for departures, including the message row
    #[serde(default = "default_lines")]
    pub lines: usize,

    /// Seconds between aggregation cycles
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    #[serde(default)]
    pub engine: EngineConfig,

    pub sources: Vec<SourceConfig>,
}

fn default_timezone() -> Tz {
    chrono_tz::Europe::Berlin
}

fn default_lines() -> usize {
    4
}

fn default_refresh_secs() -> u64 {
    30
}

/// One source path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(default)]
    pub abort_all_on_failure: bool,
    /// Tried in order until one succeeds
    pub fallbacks: Vec<FallbackConfig>,
}

/// One adapter of a fallback chain with its ordered parameter sets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "adapter", rename_all = "snake_case")]
pub enum FallbackConfig {
    DbRest { params: Vec<DbRestParams> },
    MessageServer { params: Vec<MessageServerParams> },
    File { params: Vec<FileParams> },
}

impl FallbackConfig {
    fn param_sets(&self) -> usize {
        match self {
            FallbackConfig::DbRest { params } => params.len(),
            FallbackConfig::MessageServer { params } => params.len(),
            FallbackConfig::File { params } => params.len(),
        }
    }
}

/// Config file path from the environment.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

impl AppConfig {
    /// Load and validate the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load the config file named by the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(config_path())
    }

    /// Parse and validate a config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.lines == 0 {
            return Err(ConfigError::Invalid("lines must be at least 1".into()));
        }
        if self.refresh_secs == 0 {
            return Err(ConfigError::Invalid("refresh_secs must be positive".into()));
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.is_empty() {
                return Err(ConfigError::Invalid("source name must not be empty".into()));
            }
            if !names.insert(source.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate source name '{}'",
                    source.name
                )));
            }
            if source.fallbacks.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "source '{}' has no fallbacks",
                    source.name
                )));
            }
            if source.fallbacks.iter().any(|f| f.param_sets() == 0) {
                return Err(ConfigError::Invalid(format!(
                    "source '{}' has an adapter without parameter sets",
                    source.name
                )));
            }
        }
        Ok(())
    }

    /// Time between aggregation cycles.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    /// Build the runtime source paths.
    ///
    /// HTTP adapters share one client.
    pub fn source_paths(&self) -> Result<Vec<Arc<SourcePath>>, ConfigError> {
        let http = http_client()?;

        let paths = self
            .sources
            .iter()
            .map(|source| {
                let path = SourcePath::new(source.name.as_str())
                    .abort_all_on_failure(source.abort_all_on_failure);
                let path = source.fallbacks.iter().fold(path, |path, fallback| match fallback {
                    FallbackConfig::DbRest { params } => {
                        path.fallback(DbRestAdapter::with_client(http.clone()), params.clone())
                    }
                    FallbackConfig::MessageServer { params } => path.fallback(
                        MessageServerAdapter::with_client(http.clone()),
                        params.clone(),
                    ),
                    FallbackConfig::File { params } => {
                        path.fallback(FileAdapter::new(), params.clone())
                    }
                });
                Arc::new(path)
            })
            .collect();

        Ok(paths)
    }
}
