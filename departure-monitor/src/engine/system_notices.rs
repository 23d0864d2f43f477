//! Synthesized system notices.
//!
//! Per-trip notices (delays pushing a trip off the board, early
//! terminations) are attached to the affected departure in place; notices
//! about the board as a whole are returned to the caller.

use std::collections::BTreeSet;

use tracing::debug;

use super::config::NoticeConfig;
use crate::domain::{Departure, Notice, NoticeCategory};

const NO_REALTIME_TEXT: &str = "aktuell sind keine Echtzeitdaten vorhanden...";
const NO_DEPARTURES_TEXT: &str = "aktuell keine Abfahrten";

/// Attach delay and early-termination notices and build the board notices.
///
/// `lines` is the number of board rows available to departures plus the
/// message row; the message row is the last one. When `message_exists` is
/// set the message row is already taken, so one departure row fewer is shown.
///
/// A delayed departure at or past the last shown row qualifies when its
/// planned time is not later than the actual time of the departure shown
/// just before it, i.e. it would have been visible had it run on time.
/// Qualifying departures past the last shown row force a message row;
/// those at or past the message row get a delay notice, but only once a
/// message row is needed at all.
///
/// Departures are annotated in place; the returned notices are the loose
/// board notices (no real-time data, no departures).
pub fn synthesize_system_notices(
    departures: &mut [Departure],
    lines: usize,
    message_exists: bool,
    config: &NoticeConfig,
) -> Vec<Notice> {
    let message_line = lines as i64 - 1;
    let last_shown = message_line - i64::from(message_exists);

    let mut message_needed = message_exists;
    let mut delayed = BTreeSet::new();
    let mut terminating = BTreeSet::new();

    for (di, departure) in departures.iter().enumerate() {
        let index = di as i64;
        if config.delay_enabled
            && departure.delay_minutes() >= config.delay_min_minutes
            && index >= last_shown
            && hidden_by_delay(departures, departure, index, last_shown)
        {
            if index >= message_line {
                delayed.insert(di);
            }
            if index > last_shown {
                message_needed = true;
            }
        }
        if config.early_termination_enabled && departure.early_termination {
            terminating.insert(di);
        }
    }

    let mut attached = 0;
    if message_needed {
        for &di in &delayed {
            let departure = &mut departures[di];
            let delay = format_delay(departure.delay_minutes());
            let text = if terminating.remove(&di) {
                format!(
                    "{}→{} ({}) heute {delay} später und nur bis {}",
                    departure.display_line(),
                    departure.direction_planned,
                    planned_clock(departure),
                    departure.display_direction(),
                )
            } else {
                format!(
                    "{}→{} ({}) heute {delay} später",
                    departure.display_line(),
                    departure.display_direction(),
                    planned_clock(departure),
                )
            };
            departure.notices.push(Notice::new(NoticeCategory::Delay, text));
            attached += 1;
        }
    }

    for &di in &terminating {
        if config.early_termination_only_visible && di as i64 > message_line {
            break;
        }
        let departure = &mut departures[di];
        let delay = match departure.delay_minutes() {
            d if d > 0 => format!(", heute +{d}"),
            _ => String::new(),
        };
        let text = format!(
            "{}→{} ({}{delay}) fährt nur bis {}",
            departure.display_line(),
            departure.direction_planned,
            planned_clock(departure),
            departure.display_direction(),
        );
        departure
            .notices
            .push(Notice::new(NoticeCategory::EarlyTermination, text));
        attached += 1;
    }

    if attached > 0 {
        debug!(attached, message_needed, "attached trip notices");
    }

    let mut board = Vec::new();
    match departures.first() {
        Some(first) => {
            if let Some(limit) = config.no_realtime_limit
                && !departures.iter().any(|d| d.realtime)
                && first.countdown() <= limit
            {
                board.push(Notice::new(NoticeCategory::NoRealtime, NO_REALTIME_TEXT));
            }
        }
        None => {
            if config.no_departures_enabled {
                board.push(Notice::new(NoticeCategory::NoDepartures, NO_DEPARTURES_TEXT));
            }
        }
    }
    board
}

/// Whether a delayed departure at `index` would have been shown on time.
///
/// The reference departure is the one at `last_shown`, or the one before it
/// when the candidate is itself at `last_shown`.
fn hidden_by_delay(
    departures: &[Departure],
    candidate: &Departure,
    index: i64,
    last_shown: i64,
) -> bool {
    let boundary = last_shown - i64::from(index == last_shown);
    let Ok(boundary) = usize::try_from(boundary) else {
        return false;
    };
    departures
        .get(boundary)
        .is_some_and(|b| candidate.departure_time_planned <= b.departure_time)
}

/// `"N min"`, or `"H:MM std"` above an hour.
fn format_delay(minutes: i64) -> String {
    if minutes > 60 {
        format!("{}:{:02} std", minutes / 60, minutes % 60)
    } else {
        format!("{minutes} min")
    }
}

fn planned_clock(departure: &Departure) -> String {
    departure.departure_time_planned.format("%H:%M").to_string()
}
