//! The adapter trait and its result type.

use std::fmt::Debug;

use futures::future::BoxFuture;
use serde::Serialize;

use crate::domain::{Departure, Notice};

use super::error::AdapterError;

/// Opaque key/value data a source passes through to the caller.
pub type SideData = serde_json::Map<String, serde_json::Value>;

/// What one successful source fetch returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceData {
    /// Departures in the canonical shape.
    pub departures: Vec<Departure>,
    /// Loose notices not tied to a departure.
    pub notices: Vec<Notice>,
    /// Side data, merged last-writer-wins across sources.
    pub side_data: SideData,
}

impl SourceData {
    /// Create a result from its parts.
    pub fn new(departures: Vec<Departure>, notices: Vec<Notice>, side_data: SideData) -> Self {
        Self {
            departures,
            notices,
            side_data,
        }
    }

    /// A result holding only departures.
    pub fn from_departures(departures: Vec<Departure>) -> Self {
        Self {
            departures,
            ..Self::default()
        }
    }

    /// Merge another result into this one.
    ///
    /// Departures and notices are appended; side-data keys already present
    /// are overwritten by `other`.
    pub fn merge(&mut self, other: SourceData) {
        self.departures.extend(other.departures);
        self.notices.extend(other.notices);
        for (key, value) in other.side_data {
            self.side_data.insert(key, value);
        }
    }

    /// Number of departures carrying real-time data.
    pub fn realtime_count(&self) -> usize {
        self.departures.iter().filter(|d| d.realtime).count()
    }
}

/// Integration with one physical backend.
///
/// An adapter is a function of its parameters: it must not keep state
/// between calls other than reusable plumbing such as an HTTP client.
/// `Params` is the adapter's own connection description (server URL,
/// stop id, timeout, ...); a [`SourcePath`](super::SourcePath) holds an
/// ordered list of them to fall back through.
pub trait SourceAdapter: Send + Sync + 'static {
    /// Connection parameters for one attempt.
    type Params: Debug + Send + Sync + 'static;

    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch departures, notices and side data.
    fn fetch<'a>(
        &'a self,
        params: &'a Self::Params,
    ) -> BoxFuture<'a, Result<SourceData, AdapterError>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;

    fn departure(line: &str, realtime: bool) -> Departure {
        let t = DateTime::parse_from_rfc3339("2024-03-15T10:00:00+01:00").unwrap();
        Departure::new(line, "Hbf", t, t, realtime)
    }

    fn side(pairs: &[(&str, serde_json::Value)]) -> SideData {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn merge_appends_and_overwrites() {
        let mut merged = SourceData::new(
            vec![departure("1", true)],
            vec![Notice::info("first")],
            side(&[("brightness", json!(10)), ("mode", json!("day"))]),
        );
        merged.merge(SourceData::new(
            vec![departure("2", false), departure("3", true)],
            vec![Notice::info("second")],
            side(&[("brightness", json!(15))]),
        ));

        let lines: Vec<_> = merged
            .departures
            .iter()
            .map(|d| d.line_number.as_str())
            .collect();
        assert_eq!(lines, ["1", "2", "3"]);
        assert_eq!(merged.notices.len(), 2);
        assert_eq!(merged.side_data["brightness"], json!(15));
        assert_eq!(merged.side_data["mode"], json!("day"));
        assert_eq!(merged.realtime_count(), 2);
    }
}
