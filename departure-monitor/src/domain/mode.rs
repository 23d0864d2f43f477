//! Mode of transport.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of vehicle serving a departure.
///
/// Departures whose upstream mode is unknown are shown as buses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeOfTransport {
    /// Regional and suburban rail.
    Train,
    /// Long-distance and high-speed rail.
    HighSpeed,
    /// Tram, light rail and subway.
    Tram,
    /// Bus (also the fallback for unknown modes).
    #[default]
    Bus,
    /// Suspension railway.
    Hanging,
}

impl ModeOfTransport {
    /// Short lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeOfTransport::Train => "train",
            ModeOfTransport::HighSpeed => "high_speed",
            ModeOfTransport::Tram => "tram",
            ModeOfTransport::Bus => "bus",
            ModeOfTransport::Hanging => "hanging",
        }
    }
}

impl fmt::Display for ModeOfTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
