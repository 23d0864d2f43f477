//! The aggregation engine.
//!
//! One cycle runs every configured source path concurrently (each with its
//! own retry and failover chain), merges what they return, enriches and
//! ranks the departures for display and synthesizes the notices that go
//! with them.

mod aggregate;
mod config;
mod enrich;
mod notices;
mod runner;
mod system_notices;

pub use aggregate::{AggregateError, Aggregation, Aggregator};
pub use config::{EngineConfig, NoticeConfig};
pub use enrich::{enrich, enrich_all, rank};
pub use notices::group_line_notices;
pub use runner::{PathError, RetryPolicy, run_path};
pub use system_notices::synthesize_system_notices;
