//! Enrichment and ranking of merged departures.
//!
//! Enrichment fills the derived display fields of each departure without
//! touching the raw ones; ranking drops departures too far in the past and
//! orders the rest for display.

use std::cmp::Reverse;

use chrono::{DateTime, FixedOffset, Timelike};

use crate::domain::{CANCELLED_DELAY, Departure, ModeOfTransport};

/// Fill the derived fields of one departure.
///
/// Steps, in order:
/// 1. a cancellation sentinel delay becomes `cancelled` with no delay
/// 2. countdown: kept if present, else whole minutes from `now` (truncated
///    to the minute) to the departure, rounded toward zero
/// 3. display line: kept if present, else the raw line number
/// 4. display direction: kept if present, else the head-sign (newlines as
///    `/`), else the raw direction; then every place name is removed
/// 5. mode defaults to `Bus`, delay to 0
///
/// Running it again on an enriched departure changes nothing.
pub fn enrich(departure: &mut Departure, now: DateTime<FixedOffset>, place_names: &[String]) {
    if departure.delay == Some(CANCELLED_DELAY) {
        departure.cancelled = true;
        departure.delay = Some(0);
    }

    if departure.disp_countdown.is_none() {
        let since = departure.departure_time - truncate_to_minute(now);
        departure.disp_countdown = Some(since.num_minutes());
    }

    if departure.disp_line_number.is_none() {
        departure.disp_line_number = Some(departure.line_number.clone());
    }

    let mut direction = match departure.disp_direction.take() {
        Some(existing) if !existing.is_empty() => existing,
        _ => match departure.headsign.as_deref() {
            Some(headsign) if !headsign.is_empty() => headsign.replace('\n', "/"),
            _ => departure.direction.clone(),
        },
    };
    // removing one name can join the pieces of another
    loop {
        let stripped = place_names
            .iter()
            .filter(|p| !p.is_empty())
            .fold(direction.clone(), |d, place| d.replace(place.as_str(), ""));
        if stripped == direction {
            break;
        }
        direction = stripped;
    }
    departure.disp_direction = Some(direction);

    if departure.mode.is_none() {
        departure.mode = Some(ModeOfTransport::default());
    }

    if departure.delay.is_none() {
        departure.delay = Some(0);
    }
}

/// Enrich every departure in place.
pub fn enrich_all(departures: &mut [Departure], now: DateTime<FixedOffset>, place_names: &[String]) {
    for departure in departures {
        enrich(departure, now, place_names);
    }
}

/// Filter and sort enriched departures for display.
///
/// Departures whose countdown is below `min_countdown` are dropped. The
/// rest are ordered by:
/// 1. countdown (sooner first)
/// 2. cancelled trips before running ones
/// 3. larger delay first
/// 4. early-terminating trips before full ones
///
/// The sort is stable: ties keep their merge order.
pub fn rank(mut departures: Vec<Departure>, min_countdown: i64) -> Vec<Departure> {
    departures.retain(|d| d.countdown() >= min_countdown);
    departures.sort_by_key(|d| {
        (
            d.countdown(),
            !d.cancelled,
            Reverse(d.delay_minutes()),
            !d.early_termination,
        )
    });
    departures
}

fn truncate_to_minute(now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}
