//! db-rest response DTOs.
//!
//! db-rest speaks the Friendly Public Transport Format (FPTF). Fields are
//! optional almost everywhere: cancelled trips have no `when`, older
//! servers use `formerScheduled*` where newer ones use `planned*`.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// Body of `GET /stations/{id}/departures`.
///
/// Newer servers wrap the list in an object, older ones return it bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DeparturesResponse {
    Wrapped { departures: Vec<FptfDeparture> },
    List(Vec<FptfDeparture>),
}

impl DeparturesResponse {
    /// The departures, whichever shape the server used.
    pub fn into_departures(self) -> Vec<FptfDeparture> {
        match self {
            DeparturesResponse::Wrapped { departures } => departures,
            DeparturesResponse::List(departures) => departures,
        }
    }
}

/// One departure ("alternative" in FPTF terms).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FptfDeparture {
    pub trip_id: Option<String>,

    pub stop: Option<FptfStop>,

    /// Expected departure time; absent when cancelled.
    pub when: Option<DateTime<FixedOffset>>,
    pub planned_when: Option<DateTime<FixedOffset>>,
    pub former_scheduled_when: Option<DateTime<FixedOffset>>,

    /// Delay in seconds; absent without real-time data.
    pub delay: Option<i64>,

    pub platform: Option<String>,
    pub planned_platform: Option<String>,
    pub former_scheduled_platform: Option<String>,

    pub direction: Option<String>,

    pub line: Option<FptfLine>,

    pub remarks: Option<Vec<FptfRemark>>,

    #[serde(default)]
    pub cancelled: bool,
}

/// A stop, optionally belonging to a station.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FptfStop {
    pub id: Option<String>,
    pub name: Option<String>,
    pub station: Option<FptfStation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FptfStation {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FptfLine {
    /// Display name, e.g. `"Bus 146"` or `"RE 1"`.
    pub name: Option<String>,
    /// Product, e.g. `"bus"`, `"regional"`, `"nationalExpress"`.
    pub product: Option<String>,
    /// FPTF mode, e.g. `"train"`, `"bus"`.
    pub mode: Option<String>,
}

/// A hint or warning attached to a departure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FptfRemark {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub code: Option<String>,
    pub summary: Option<String>,
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_list() {
        let json = r#"[{"tripId": "1|2", "when": "2024-03-15T10:05:00+01:00", "delay": 60}]"#;
        let response: DeparturesResponse = serde_json::from_str(json).unwrap();
        let deps = response.into_departures();

        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].trip_id.as_deref(), Some("1|2"));
        assert_eq!(deps[0].delay, Some(60));
        assert!(!deps[0].cancelled);
    }

    #[test]
    fn parses_wrapped_list() {
        let json = r#"{"departures": [{"cancelled": true, "when": null}], "realtimeDataUpdatedAt": 1}"#;
        let response: DeparturesResponse = serde_json::from_str(json).unwrap();
        let deps = response.into_departures();

        assert_eq!(deps.len(), 1);
        assert!(deps[0].cancelled);
        assert!(deps[0].when.is_none());
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(serde_json::from_str::<DeparturesResponse>(r#"{"error": "x"}"#).is_err());
    }
}
