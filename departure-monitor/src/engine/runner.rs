//! Retry and failover for a single source path.
//!
//! Walks a path's fallback chain in order: adapters first to last, and for
//! each adapter its parameter sets first to last. Each parameter set gets
//! `max_retries + 1` attempts with a linear backoff between them. The first
//! success ends the walk.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::source::{SourceData, SourcePath};

/// Retry settings shared by every path of an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt of each parameter set.
    pub max_retries: u32,

    /// Attempt `k` is preceded by a sleep of `k * backoff_factor`.
    pub backoff_factor: Duration,
}

impl RetryPolicy {
    /// Create a new policy.
    pub fn new(max_retries: u32, backoff_factor: Duration) -> Self {
        Self {
            max_retries,
            backoff_factor,
        }
    }

    /// Attempts made per parameter set before giving up on it.
    pub fn attempts_per_param_set(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Sleep before the given attempt (0-based).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.backoff_factor.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_factor: Duration::from_millis(500),
        }
    }
}

/// Failure of a whole source path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Every adapter and parameter set failed
    #[error("source path '{path}' exhausted all fallbacks after {attempts} attempts")]
    Exhausted { path: String, attempts: u32 },
}

/// Run a path's fallback chain until one attempt succeeds.
///
/// Adapter errors never escape: they are logged (transient ones at `warn`,
/// anything else at `error`) and the next attempt is made. Only when the
/// whole chain is exhausted does this return [`PathError::Exhausted`].
pub async fn run_path(path: &SourcePath, policy: &RetryPolicy) -> Result<SourceData, PathError> {
    let mut attempts: u32 = 0;

    for step in path.steps() {
        for index in 0..step.param_sets() {
            for attempt in 0..policy.attempts_per_param_set() {
                let delay = policy.delay_before(attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }

                let Some(fetch) = step.attempt(index) else {
                    break;
                };
                attempts += 1;

                match fetch.await {
                    Ok(data) => {
                        debug!(
                            path = %path.name(),
                            adapter = step.adapter_name(),
                            param_set = index,
                            attempt,
                            "source path succeeded"
                        );
                        return Ok(data);
                    }
                    Err(e) if e.is_transient() => {
                        warn!(
                            path = %path.name(),
                            adapter = step.adapter_name(),
                            params = %step.describe(index),
                            attempt,
                            error = %e,
                            "source attempt failed"
                        );
                    }
                    Err(e) => {
                        error!(
                            path = %path.name(),
                            adapter = step.adapter_name(),
                            params = %step.describe(index),
                            attempt,
                            error = ?e,
                            "unexpected source failure"
                        );
                    }
                }
            }

            warn!(
                path = %path.name(),
                adapter = step.adapter_name(),
                params = %step.describe(index),
                attempts = policy.attempts_per_param_set(),
                "parameter set failed every attempt, continuing with next if any"
            );
        }

        warn!(
            path = %path.name(),
            adapter = step.adapter_name(),
            "adapter failed all parameter sets, continuing with next if any"
        );
    }

    warn!(path = %path.name(), attempts, "source path exhausted all fallbacks");

    Err(PathError::Exhausted {
        path: path.name().to_string(),
        attempts,
    })
}
