//! Engine configuration.

use std::time::Duration;

use serde::Deserialize;

use super::runner::RetryPolicy;

/// Configuration for one aggregation cycle.
///
/// Every field has a default, so a config file only needs to name what it
/// changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Place names stripped from displayed directions
    /// (e.g. the monitor's own town).
    pub place_names: Vec<String>,

    /// Departures with a countdown below this are dropped (minutes).
    /// Negative, so slightly overdue departures stay visible.
    pub min_countdown: i64,

    /// Retries per parameter set after the first attempt.
    pub max_retries: u32,

    /// Backoff factor in seconds; attempt k waits `k * factor`.
    pub retry_backoff_secs: f64,

    /// System notice settings.
    pub notices: NoticeConfig,
}

impl EngineConfig {
    /// Retry policy for the source runners.
    pub fn retry_policy(&self) -> RetryPolicy {
        let backoff = Duration::try_from_secs_f64(self.retry_backoff_secs.max(0.0))
            .unwrap_or(Duration::ZERO);
        RetryPolicy::new(self.max_retries, backoff)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            place_names: Vec::new(),
            min_countdown: -9,
            max_retries: 2,
            retry_backoff_secs: 0.5,
            notices: NoticeConfig::default(),
        }
    }
}

/// Settings for synthesized system notices.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NoticeConfig {
    /// Emit notices for departures pushed off-screen by a delay.
    pub delay_enabled: bool,

    /// Minimum delay (minutes) for a delay notice.
    pub delay_min_minutes: i64,

    /// Emit notices for early-terminating trips.
    pub early_termination_enabled: bool,

    /// Only emit early-termination notices up to the message line.
    pub early_termination_only_visible: bool,

    /// Emit a notice when there are no departures.
    pub no_departures_enabled: bool,

    /// Emit a no-real-time notice when the first departure is at most this
    /// many minutes away and nothing is real-time. `None` disables it.
    pub no_realtime_limit: Option<i64>,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            delay_enabled: true,
            delay_min_minutes: 1,
            early_termination_enabled: true,
            early_termination_only_visible: true,
            no_departures_enabled: true,
            no_realtime_limit: Some(20),
        }
    }
}
