//! Plain-text board rendering.
//!
//! Lays out an [`Aggregation`] on a fixed number of rows the way a
//! departure display would: one row per departure, and when there is
//! anything to say, the last row becomes a message ticker. The layout takes
//! the departures in the order given; it never filters or re-ranks.

use std::collections::HashSet;

use crate::domain::Departure;
use crate::engine::Aggregation;

const LINE_WIDTH: usize = 5;
const DIRECTION_WIDTH: usize = 24;
const MESSAGE_SEPARATOR: &str = " +++ ";

/// Render the board on `lines` rows.
pub fn render_board(aggregation: &Aggregation, lines: usize) -> String {
    let messages = message_texts(aggregation);
    let rows = if messages.is_empty() {
        lines
    } else {
        lines.saturating_sub(1)
    };

    let mut out = String::new();
    for departure in aggregation.departures.iter().take(rows) {
        out.push_str(&departure_row(departure));
        out.push('\n');
    }
    if !messages.is_empty() && lines > 0 {
        out.push_str(&messages.join(MESSAGE_SEPARATOR));
        out.push('\n');
    }
    out
}

/// Loose notices first, then per-trip notices; each distinct text once.
fn message_texts(aggregation: &Aggregation) -> Vec<&str> {
    let mut seen = HashSet::new();
    aggregation
        .notices
        .iter()
        .chain(aggregation.departures.iter().flat_map(|d| &d.notices))
        .map(|n| n.text.as_str())
        .filter(|t| !t.is_empty() && seen.insert(*t))
        .collect()
}

fn departure_row(departure: &Departure) -> String {
    let time = if departure.cancelled {
        "entfällt".to_string()
    } else {
        match departure.countdown() {
            c if c <= 0 => "jetzt".to_string(),
            c => format!("{c} min"),
        }
    };
    let delay = match departure.delay_minutes() {
        d if d > 0 && !departure.cancelled => format!(" +{d}"),
        _ => String::new(),
    };

    format!(
        "{:<lw$} {:<dw$} {:>8}{delay}",
        truncate(departure.display_line(), LINE_WIDTH),
        truncate(departure.display_direction(), DIRECTION_WIDTH),
        time,
        lw = LINE_WIDTH,
        dw = DIRECTION_WIDTH,
    )
}

fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Notice, NoticeCategory};
    use crate::testing::enriched;

    fn aggregation(departures: Vec<Departure>, notices: Vec<Notice>) -> Aggregation {
        Aggregation {
            departures,
            notices,
            ..Aggregation::default()
        }
    }

    #[test]
    fn rows_without_messages() {
        let board = render_board(
            &aggregation(
                vec![enriched("107", "Essen Hbf", 0), enriched("U18", "Mülheim", 4)],
                Vec::new(),
            ),
            3,
        );

        assert!(board.ends_with("4 min\n"));
        let rows: Vec<_> = board.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("107   Essen Hbf"));
        assert!(rows[0].ends_with("jetzt"));
        assert!(rows[1].ends_with("4 min"));
    }

    #[test]
    fn message_row_takes_last_line() {
        let mut hidden = enriched("146", "Kray", 20);
        hidden
            .notices
            .push(Notice::new(NoticeCategory::Delay, "146→Kray (10:10) heute 10 min später"));
        let deps = vec![
            enriched("1", "A", 1),
            enriched("2", "B", 2),
            enriched("3", "C", 3),
            hidden,
        ];
        let notices = vec![Notice::info("Aufzug defekt")];

        let board = render_board(&aggregation(deps, notices), 3);

        let rows: Vec<_> = board.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("1 "));
        assert!(rows[1].starts_with("2 "));
        assert_eq!(
            rows[2],
            "Aufzug defekt +++ 146→Kray (10:10) heute 10 min später"
        );
    }

    #[test]
    fn duplicate_texts_shown_once() {
        let mut a = enriched("3", "Steele", 1);
        a.notices.push(Notice::info("3, 3A: Bauarbeiten"));
        let mut b = enriched("3A", "Steele", 2);
        b.notices.push(Notice::info("3, 3A: Bauarbeiten"));

        let board = render_board(&aggregation(vec![a, b], Vec::new()), 3);

        assert_eq!(board.lines().last(), Some("3, 3A: Bauarbeiten"));
    }

    #[test]
    fn cancelled_and_delayed_rows() {
        let mut cancelled = enriched("RE1", "Aachen", 5);
        cancelled.cancelled = true;
        let mut late = enriched("RE2", "Münster", 7);
        late.delay = Some(3);

        let board = render_board(&aggregation(vec![cancelled, late], Vec::new()), 2);
        let rows: Vec<_> = board.lines().collect();

        assert!(rows[0].ends_with("entfällt"));
        assert!(rows[1].ends_with("7 min +3"));
    }

    #[test]
    fn empty_board() {
        let notices = vec![Notice::new(NoticeCategory::NoDepartures, "aktuell keine Abfahrten")];
        let board = render_board(&aggregation(Vec::new(), notices), 4);
        assert_eq!(board, "aktuell keine Abfahrten\n");

        assert_eq!(render_board(&Aggregation::default(), 0), "");
    }
}
