//! Aggregation orchestrator and entry point.
//!
//! Every source path runs as its own task; results are merged as the tasks
//! finish, then enriched, ranked and annotated with notices in one pass.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use futures::FutureExt;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, error, trace};

use super::config::EngineConfig;
use super::enrich::{enrich_all, rank};
use super::notices::group_line_notices;
use super::runner::run_path;
use super::system_notices::synthesize_system_notices;
use crate::domain::{Departure, Notice};
use crate::source::{SideData, SourceData, SourcePath};

/// Aggregation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    /// A path marked `abort_all_on_failure` exhausted its fallbacks
    #[error("aggregation aborted: critical source path '{path}' failed")]
    Aborted { path: String },
}

/// Result of one aggregation cycle, ready for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    /// Enriched, filtered and ranked departures with their notices attached.
    pub departures: Vec<Departure>,
    /// Loose notices: those from sources first, then synthesized ones.
    pub notices: Vec<Notice>,
    /// Merged side data from all sources.
    pub side_data: SideData,
}

/// Runs aggregation cycles with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: EngineConfig,
}

impl Aggregator {
    /// Create an aggregator.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Aggregate all paths, measuring countdowns from the current time in `tz`.
    ///
    /// `lines` is the number of display rows for departures including the
    /// row reserved for messages.
    pub async fn aggregate(
        &self,
        paths: &[Arc<SourcePath>],
        tz: Tz,
        lines: usize,
    ) -> Result<Aggregation, AggregateError> {
        let now = Utc::now().with_timezone(&tz).fixed_offset();
        self.aggregate_at(paths, now, lines).await
    }

    /// Aggregate all paths as of `now`.
    ///
    /// Returns [`AggregateError::Aborted`] when a critical path fails; in
    /// that case nothing fetched by the other paths is returned.
    pub async fn aggregate_at(
        &self,
        paths: &[Arc<SourcePath>],
        now: DateTime<FixedOffset>,
        lines: usize,
    ) -> Result<Aggregation, AggregateError> {
        let merged = self.collect(paths).await?;
        Ok(self.finish(merged, now, lines))
    }

    /// Run every path concurrently and merge results in completion order.
    async fn collect(&self, paths: &[Arc<SourcePath>]) -> Result<SourceData, AggregateError> {
        let policy = self.config.retry_policy();
        let mut tasks = JoinSet::new();

        for path in paths {
            let path = Arc::clone(path);
            tasks.spawn(async move {
                let outcome = AssertUnwindSafe(run_path(&path, &policy))
                    .catch_unwind()
                    .await;
                (path, outcome)
            });
        }

        let mut merged = SourceData::default();

        while let Some(joined) = tasks.join_next().await {
            let (path, outcome) = match joined {
                Ok(finished) => finished,
                Err(e) => {
                    error!(error = %e, "source task did not complete");
                    continue;
                }
            };

            let reason = match outcome {
                Ok(Ok(data)) => {
                    trace!(
                        path = %path.name(),
                        departures = data.departures.len(),
                        realtime = data.realtime_count(),
                        notices = data.notices.len(),
                        side_data = data.side_data.len(),
                        "source path returned"
                    );
                    merged.merge(data);
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(panic) => format!("panicked: {}", panic_message(panic.as_ref())),
            };

            let abort = path.aborts_all_on_failure();
            error!(path = %path.name(), abort, reason = %reason, "source path failed");
            if abort {
                // dropping the set aborts the paths still in flight
                return Err(AggregateError::Aborted {
                    path: path.name().to_string(),
                });
            }
        }

        Ok(merged)
    }

    /// Enrich, rank and annotate merged source data.
    fn finish(&self, merged: SourceData, now: DateTime<FixedOffset>, lines: usize) -> Aggregation {
        let SourceData {
            mut departures,
            mut notices,
            side_data,
        } = merged;

        enrich_all(&mut departures, now, &self.config.place_names);
        let mut departures = rank(departures, self.config.min_countdown);

        let visible_notice = group_line_notices(&mut departures, lines.saturating_sub(1));
        let message_exists = !notices.is_empty() || visible_notice;

        let system = synthesize_system_notices(
            &mut departures,
            lines,
            message_exists,
            &self.config.notices,
        );
        notices.extend(system);

        debug!(
            departures = departures.len(),
            notices = notices.len(),
            message_exists,
            "aggregation finished"
        );

        Aggregation {
            departures,
            notices,
            side_data,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
