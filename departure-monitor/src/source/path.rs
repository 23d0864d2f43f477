//! Source paths: one logical feed with its fallback chain.

use std::fmt;

use futures::future::BoxFuture;

use super::adapter::{SourceAdapter, SourceData};
use super::error::AdapterError;

/// One link of a fallback chain with the adapter type erased.
pub(crate) trait FallbackStep: Send + Sync {
    /// Adapter name for logs.
    fn adapter_name(&self) -> &str;

    /// Number of parameter sets to try, in order.
    fn param_sets(&self) -> usize;

    /// Debug rendering of one parameter set for logs.
    fn describe(&self, index: usize) -> String;

    /// Start a fetch with the parameter set at `index`.
    fn attempt(&self, index: usize) -> Option<BoxFuture<'_, Result<SourceData, AdapterError>>>;
}

/// An adapter together with its ordered parameter sets.
struct Fallback<A: SourceAdapter> {
    adapter: A,
    params: Vec<A::Params>,
}

impl<A: SourceAdapter> FallbackStep for Fallback<A> {
    fn adapter_name(&self) -> &str {
        self.adapter.name()
    }

    fn param_sets(&self) -> usize {
        self.params.len()
    }

    fn describe(&self, index: usize) -> String {
        self.params
            .get(index)
            .map(|p| format!("{p:?}"))
            .unwrap_or_default()
    }

    fn attempt(&self, index: usize) -> Option<BoxFuture<'_, Result<SourceData, AdapterError>>> {
        let params = self.params.get(index)?;
        Some(self.adapter.fetch(params))
    }
}

/// One logical transit-data feed.
///
/// A path is tried adapter by adapter, and within each adapter parameter
/// set by parameter set, until one attempt succeeds. When every fallback
/// fails, the path contributes nothing to the aggregation, or aborts the
/// whole aggregation if it was marked with `abort_all_on_failure`.
///
/// # Examples
///
/// ```no_run
/// use departure_monitor::adapters::dbrest::{DbRestAdapter, DbRestParams};
/// use departure_monitor::source::SourcePath;
///
/// let adapter = DbRestAdapter::new().unwrap();
/// let path = SourcePath::new("db-main")
///     .abort_all_on_failure(true)
///     .fallback(
///         adapter,
///         vec![
///             DbRestParams::new("https://v6.db.transport.rest", "8000098"),
///             DbRestParams::new("https://backup.example.org", "8000098"),
///         ],
///     );
/// assert_eq!(path.name(), "db-main");
/// ```
pub struct SourcePath {
    name: String,
    abort_all_on_failure: bool,
    steps: Vec<Box<dyn FallbackStep>>,
}

impl SourcePath {
    /// Create an empty, non-critical path.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abort_all_on_failure: false,
            steps: Vec::new(),
        }
    }

    /// Mark whether failure of this path aborts the whole aggregation.
    pub fn abort_all_on_failure(mut self, abort: bool) -> Self {
        self.abort_all_on_failure = abort;
        self
    }

    /// Append an adapter with its ordered parameter sets to the chain.
    pub fn fallback<A: SourceAdapter>(mut self, adapter: A, params: Vec<A::Params>) -> Self {
        self.steps.push(Box::new(Fallback { adapter, params }));
        self
    }

    /// Path name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether failure of this path aborts the aggregation.
    pub fn aborts_all_on_failure(&self) -> bool {
        self.abort_all_on_failure
    }

    /// Number of adapters in the chain.
    pub fn fallback_count(&self) -> usize {
        self.steps.len()
    }

    pub(crate) fn steps(&self) -> &[Box<dyn FallbackStep>] {
        &self.steps
    }
}

impl fmt::Debug for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourcePath")
            .field("name", &self.name)
            .field("abort_all_on_failure", &self.abort_all_on_failure)
            .field(
                "adapters",
                &self.steps.iter().map(|s| s.adapter_name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
