//! Conversion from FPTF DTOs to departures.

use chrono::TimeDelta;
use tracing::error;

use crate::domain::{Departure, ModeOfTransport, Notice};

use super::types::{FptfDeparture, FptfLine, FptfRemark};

/// Operator prefixes removed from line names (`"Bus 146"` becomes `"146"`).
const LINE_PREFIXES: [&str; 6] = ["Bus ", "STR ", "ABR ", "ERB ", "NWB ", "WFB "];

/// Error during DTO to departure conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Delay cannot be applied to the departure time
    #[error("delay of {0} s is out of range")]
    DelayOutOfRange(i64),
}

/// Limits and filters applied while converting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertOptions {
    /// Stop after this many departures have been kept.
    pub limit: usize,
    /// Keep only these modes (empty keeps all).
    pub include_modes: Vec<ModeOfTransport>,
    /// Drop these modes.
    pub exclude_modes: Vec<ModeOfTransport>,
}

impl ConvertOptions {
    fn keeps(&self, mode: Option<ModeOfTransport>) -> bool {
        let excluded = mode.is_some_and(|m| self.exclude_modes.contains(&m));
        let included = self.include_modes.is_empty()
            || mode.is_some_and(|m| self.include_modes.contains(&m));
        !excluded && included
    }
}

/// Convert FPTF departures in server order.
///
/// Departures without any departure time are logged and skipped; a
/// departure without a line name or stop fails the whole conversion.
pub fn convert_departures(
    departures: &[FptfDeparture],
    options: &ConvertOptions,
) -> Result<Vec<Departure>, ConversionError> {
    let mut result = Vec::new();

    for dep in departures {
        if result.len() >= options.limit {
            break;
        }

        let line = dep.line.as_ref().ok_or(ConversionError::MissingField("line"))?;
        let line_name = line
            .name
            .as_deref()
            .ok_or(ConversionError::MissingField("line.name"))?;

        let mode = mode_of(line);
        if !options.keeps(mode) {
            continue;
        }

        let stop = dep.stop.as_ref().ok_or(ConversionError::MissingField("stop"))?;

        let (departure_time, departure_time_planned) = match dep.when {
            Some(when) => {
                let planned = match dep.delay {
                    Some(secs) => TimeDelta::try_seconds(secs)
                        .and_then(|delay| when.checked_sub_signed(delay))
                        .ok_or(ConversionError::DelayOutOfRange(secs))?,
                    None => when,
                };
                (when, planned)
            }
            None => match dep.planned_when.or(dep.former_scheduled_when) {
                Some(planned) => (planned, planned),
                None => {
                    error!(trip = ?dep.trip_id, line = line_name, "departure without any time, skipping");
                    continue;
                }
            },
        };

        let realtime = dep.delay.is_some() || dep.cancelled;

        let mut departure = Departure::new(
            strip_prefixes(line_name),
            dep.direction.clone().unwrap_or_default(),
            departure_time_planned,
            departure_time,
            realtime,
        );
        departure.delay = dep.delay.map(delay_minutes);
        departure.mode = mode;
        departure.cancelled = dep.cancelled;
        departure.platform = dep.platform.clone();
        departure.platform_planned = dep
            .planned_platform
            .clone()
            .or_else(|| dep.former_scheduled_platform.clone());
        departure.stop_name = stop
            .station
            .as_ref()
            .and_then(|s| s.name.clone())
            .or_else(|| stop.name.clone());
        departure.stop_id = stop.id.clone();
        departure.notices = dep
            .remarks
            .iter()
            .flatten()
            .filter_map(remark_text)
            .map(Notice::info)
            .collect();

        result.push(departure);
    }

    Ok(result)
}

/// Mode from the FPTF product, falling back to the FPTF mode for trains.
fn mode_of(line: &FptfLine) -> Option<ModeOfTransport> {
    match line.product.as_deref() {
        Some("bus") => Some(ModeOfTransport::Bus),
        Some("nationalExp" | "nationalExpress" | "national") => Some(ModeOfTransport::HighSpeed),
        Some("tram" | "subway") => Some(ModeOfTransport::Tram),
        _ if line.mode.as_deref() == Some("train") => Some(ModeOfTransport::Train),
        _ => None,
    }
}

fn strip_prefixes(name: &str) -> String {
    let mut name = name.to_string();
    for prefix in LINE_PREFIXES {
        if name.starts_with(prefix) {
            name = name.replace(prefix, "");
        }
    }
    name
}

/// Whole minutes, ties to even.
fn delay_minutes(secs: i64) -> i64 {
    (secs as f64 / 60.0).round_ties_even() as i64
}

/// `"<summary>: <text>"` on one line, without the summary's trailing dot.
fn remark_text(remark: &FptfRemark) -> Option<String> {
    let text = remark.text.as_deref()?;
    let summary = remark
        .summary
        .as_deref()
        .map(|s| s.strip_suffix('.').unwrap_or(s))
        .filter(|s| !s.is_empty());
    let joined = match summary {
        Some(summary) => format!("{summary}: {text}"),
        None => text.to_string(),
    };
    Some(joined.replace('\n', " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::dbrest::types::DeparturesResponse;

    const BOARD: &str = r#"[
        {
            "tripId": "1|100",
            "stop": {"id": "8000098", "name": "Essen Hbf (Bussteig)", "station": {"id": "8000098", "name": "Essen Hbf"}},
            "when": "2024-03-15T10:07:00+01:00",
            "delay": 150,
            "platform": "3",
            "formerScheduledPlatform": "2",
            "direction": "Dortmund Hbf",
            "line": {"name": "Bus 146", "product": "bus", "mode": "bus"},
            "remarks": [
                {"type": "warning", "summary": "Umleitung.", "text": "Haltestelle\nverlegt"},
                {"type": "hint", "code": "bf", "text": "barrierefrei"}
            ]
        },
        {
            "tripId": "1|101",
            "stop": {"id": "8000098", "name": "Essen Hbf"},
            "when": null,
            "plannedWhen": "2024-03-15T10:10:00+01:00",
            "cancelled": true,
            "direction": "Köln Hbf",
            "line": {"name": "ICE 945", "product": "nationalExpress", "mode": "train"},
            "remarks": []
        },
        {
            "tripId": "1|102",
            "stop": {"id": "8000098", "name": "Essen Hbf"},
            "when": "2024-03-15T10:12:00+01:00",
            "direction": "Aachen Hbf",
            "line": {"name": "RE 1", "product": "regional", "mode": "train"}
        },
        {
            "tripId": "1|103",
            "stop": {"id": "8000098", "name": "Essen Hbf"},
            "when": null,
            "cancelled": true,
            "direction": "Nowhere",
            "line": {"name": "STR 107", "product": "tram", "mode": "train"}
        },
        {
            "tripId": "1|104",
            "stop": {"id": "8000098", "name": "Essen Hbf"},
            "when": "2024-03-15T10:15:00+01:00",
            "delay": 0,
            "direction": "Gelsenkirchen",
            "line": {"name": "STR 107", "product": "tram", "mode": "train"}
        }
    ]"#;

    fn board() -> Vec<FptfDeparture> {
        serde_json::from_str::<DeparturesResponse>(BOARD)
            .unwrap()
            .into_departures()
    }

    fn options() -> ConvertOptions {
        ConvertOptions {
            limit: 20,
            ..ConvertOptions::default()
        }
    }

    #[test]
    fn converts_realtime_bus() {
        let deps = convert_departures(&board(), &options()).unwrap();
        let bus = &deps[0];

        assert_eq!(bus.line_number, "146");
        assert_eq!(bus.direction, "Dortmund Hbf");
        assert_eq!(bus.mode, Some(ModeOfTransport::Bus));
        assert!(bus.realtime);
        // 150 s is 2.5 min, ties go to even
        assert_eq!(bus.delay, Some(2));
        assert_eq!(bus.departure_time.to_rfc3339(), "2024-03-15T10:07:00+01:00");
        assert_eq!(
            bus.departure_time_planned.to_rfc3339(),
            "2024-03-15T10:04:30+01:00"
        );
        assert_eq!(bus.platform.as_deref(), Some("3"));
        assert_eq!(bus.platform_planned.as_deref(), Some("2"));
        assert_eq!(bus.stop_name.as_deref(), Some("Essen Hbf"));
        assert_eq!(bus.stop_id.as_deref(), Some("8000098"));

        let texts: Vec<_> = bus.notices.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, ["Umleitung: Haltestelle verlegt", "barrierefrei"]);
    }

    #[test]
    fn cancelled_trip_uses_planned_time() {
        let deps = convert_departures(&board(), &options()).unwrap();
        let ice = &deps[1];

        assert_eq!(ice.line_number, "ICE 945");
        assert_eq!(ice.mode, Some(ModeOfTransport::HighSpeed));
        assert!(ice.cancelled);
        assert!(ice.realtime);
        assert_eq!(ice.delay, None);
        assert_eq!(ice.departure_time, ice.departure_time_planned);
        assert_eq!(ice.stop_name.as_deref(), Some("Essen Hbf"));
    }

    #[test]
    fn departure_without_time_is_skipped() {
        let deps = convert_departures(&board(), &options()).unwrap();
        let lines: Vec<_> = deps.iter().map(|d| d.line_number.as_str()).collect();

        assert_eq!(lines, ["146", "ICE 945", "RE 1", "107"]);
        assert_eq!(deps[2].mode, Some(ModeOfTransport::Train));
        assert!(!deps[2].realtime);
        assert_eq!(deps[3].mode, Some(ModeOfTransport::Tram));
        assert_eq!(deps[3].delay, Some(0));
    }

    #[test]
    fn mode_filters_and_limit() {
        let only_trams = ConvertOptions {
            include_modes: vec![ModeOfTransport::Tram],
            ..options()
        };
        let deps = convert_departures(&board(), &only_trams).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].direction, "Gelsenkirchen");

        let no_buses = ConvertOptions {
            exclude_modes: vec![ModeOfTransport::Bus],
            limit: 2,
            ..options()
        };
        let deps = convert_departures(&board(), &no_buses).unwrap();
        let lines: Vec<_> = deps.iter().map(|d| d.line_number.as_str()).collect();
        assert_eq!(lines, ["ICE 945", "RE 1"]);
    }

    #[test]
    fn unknown_product_has_no_mode() {
        let line = FptfLine {
            name: Some("X".into()),
            product: Some("ferry".into()),
            mode: Some("watercraft".into()),
        };
        assert_eq!(mode_of(&line), None);

        let only_buses = ConvertOptions {
            include_modes: vec![ModeOfTransport::Bus],
            ..options()
        };
        assert!(!only_buses.keeps(None));
        assert!(options().keeps(None));
    }

    #[test]
    fn missing_line_is_an_error() {
        let deps = vec![FptfDeparture::default()];
        let err = convert_departures(&deps, &options()).unwrap_err();
        assert_eq!(err.to_string(), "missing required field: line");
    }

    #[test]
    fn out_of_range_delay_is_an_error() {
        let mut deps = board();
        deps[0].delay = Some(i64::MAX);

        let err = convert_departures(&deps, &options()).unwrap_err();
        assert!(matches!(err, ConversionError::DelayOutOfRange(i64::MAX)));
    }

    #[test]
    fn prefixes_and_rounding() {
        assert_eq!(strip_prefixes("Bus SB16"), "SB16");
        assert_eq!(strip_prefixes("NWB RB43"), "RB43");
        assert_eq!(strip_prefixes("S 1"), "S 1");
        assert_eq!(delay_minutes(90), 2);
        assert_eq!(delay_minutes(30), 0);
        assert_eq!(delay_minutes(-150), -2);
        assert_eq!(delay_minutes(100), 2);
    }
}
