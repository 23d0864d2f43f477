//! Departure records.
//!
//! A `Departure` is one trip calling at the monitored stop. Adapters fill
//! the raw fields; the engine derives the `disp_*` display fields during
//! enrichment and never overwrites the raw ones.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{ModeOfTransport, Notice};

/// Delay value some backends report for a cancelled trip.
///
/// Enrichment turns it into `cancelled = true` with no delay.
pub const CANCELLED_DELAY: i64 = -9999;

/// One scheduled or real-time departure at a stop.
///
/// # Time Semantics
///
/// - `departure_time_planned` is the timetabled time
/// - `departure_time` is the best known actual time (equal to the planned
///   time when no real-time data exists)
/// - `delay` is in whole minutes, `None` when the backend said nothing
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use departure_monitor::domain::Departure;
///
/// let planned = DateTime::parse_from_rfc3339("2024-03-15T10:00:00+01:00").unwrap();
/// let actual = DateTime::parse_from_rfc3339("2024-03-15T10:03:00+01:00").unwrap();
///
/// let mut departure = Departure::new("U79", "Duisburg Hbf", planned, actual, true);
/// departure.delay = Some(3);
///
/// assert_eq!(departure.display_line(), "U79");
/// assert_eq!(departure.display_direction(), "Duisburg Hbf");
/// assert_eq!(departure.delay_minutes(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Departure {
    /// Line number as sent by the backend
    pub line_number: String,
    /// Actual destination (differs from planned on early termination)
    pub direction: String,
    /// Timetabled destination
    pub direction_planned: String,
    /// Best known departure time
    pub departure_time: DateTime<FixedOffset>,
    /// Timetabled departure time
    pub departure_time_planned: DateTime<FixedOffset>,
    /// Whether the backend had real-time data for this trip
    pub realtime: bool,
    /// Delay in minutes
    pub delay: Option<i64>,
    /// Per-trip notices
    #[serde(default)]
    pub notices: Vec<Notice>,
    /// Route summary
    pub course_summary: Option<String>,
    /// Mode of transport, if the backend knows it
    pub mode: Option<ModeOfTransport>,
    /// Actual platform
    pub platform: Option<String>,
    /// Timetabled platform
    pub platform_planned: Option<String>,
    /// Kind of platform (e.g. "Gleis", "Bstg.")
    pub platform_type: Option<String>,
    /// Stop name
    pub stop_name: Option<String>,
    /// Stop identifier in the backend's namespace
    pub stop_id: Option<String>,
    /// Place (municipality) of the stop
    pub place: Option<String>,
    /// Whether the trip is cancelled
    #[serde(default)]
    pub cancelled: bool,
    /// Whether the trip ends before its planned destination
    #[serde(default)]
    pub early_termination: bool,
    /// Head-sign text, may span several lines
    pub headsign: Option<String>,
    /// Best known arrival time
    pub arrival_time: Option<DateTime<FixedOffset>>,
    /// Timetabled arrival time
    pub arrival_time_planned: Option<DateTime<FixedOffset>>,
    /// Minutes until departure as shown to riders
    pub disp_countdown: Option<i64>,
    /// Line number as shown to riders
    pub disp_line_number: Option<String>,
    /// Direction as shown to riders
    pub disp_direction: Option<String>,
}

impl Departure {
    /// Creates a departure with the required fields; everything else is empty.
    ///
    /// The planned direction starts out equal to `direction`.
    pub fn new(
        line_number: impl Into<String>,
        direction: impl Into<String>,
        departure_time_planned: DateTime<FixedOffset>,
        departure_time: DateTime<FixedOffset>,
        realtime: bool,
    ) -> Self {
        let direction = direction.into();
        Self {
            line_number: line_number.into(),
            direction_planned: direction.clone(),
            direction,
            departure_time,
            departure_time_planned,
            realtime,
            delay: None,
            notices: Vec::new(),
            course_summary: None,
            mode: None,
            platform: None,
            platform_planned: None,
            platform_type: None,
            stop_name: None,
            stop_id: None,
            place: None,
            cancelled: false,
            early_termination: false,
            headsign: None,
            arrival_time: None,
            arrival_time_planned: None,
            disp_countdown: None,
            disp_line_number: None,
            disp_direction: None,
        }
    }

    /// Displayed countdown in minutes, 0 if not yet derived.
    pub fn countdown(&self) -> i64 {
        self.disp_countdown.unwrap_or(0)
    }

    /// Displayed line number, falling back to the raw one.
    pub fn display_line(&self) -> &str {
        self.disp_line_number.as_deref().unwrap_or(&self.line_number)
    }

    /// Displayed direction, falling back to the raw one.
    pub fn display_direction(&self) -> &str {
        self.disp_direction.as_deref().unwrap_or(&self.direction)
    }

    /// Delay in minutes, 0 if unknown.
    pub fn delay_minutes(&self) -> i64 {
        self.delay.unwrap_or(0)
    }

    /// Mode of transport, `Bus` if unknown.
    pub fn mode_or_default(&self) -> ModeOfTransport {
        self.mode.unwrap_or_default()
    }
}
