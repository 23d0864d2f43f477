//! Line-notice deduplication.
//!
//! Upstream feeds often attach the same line-wide disruption text to every
//! trip of every affected line. Grouping rewrites such texts once with the
//! set of affected lines as a prefix, so the board can show them compactly.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Departure, NoticeCategory};

static LINE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zA-Z]+) *([0-9]+)").expect("line number pattern is valid"));

/// Strings by which a notice could refer to the departure's own line.
fn self_references(departure: &Departure) -> HashSet<String> {
    let display = departure.display_line();
    let raw = departure.line_number.as_str();

    let mut refs: HashSet<String> = [
        display.to_string(),
        raw.to_string(),
        display.replace(' ', ""),
        raw.replace(' ', ""),
    ]
    .into_iter()
    .collect();

    if let Some(caps) = LINE_NUMBER.captures(display) {
        refs.insert(format!("{}{}", &caps[1], &caps[2]));
        refs.insert(format!("{} {}", &caps[1], &caps[2]));
    }
    refs
}

#[derive(Default)]
struct Group {
    lines: BTreeSet<String>,
    positions: Vec<(usize, usize)>,
}

/// Group generic notices shared across the first `visible` departures.
///
/// A notice that does not mention its own departure's line is generic; all
/// visible occurrences of the same generic text are rewritten to
/// `"<lines>: <text>"` with the sorted, comma-joined display lines of every
/// departure carrying it. Afterwards every per-trip notice in the whole
/// list (not only the visible window) becomes a grouped `info` notice.
///
/// Returns whether any per-trip notice lies within the visible window.
pub fn group_line_notices(departures: &mut [Departure], visible: usize) -> bool {
    let window = visible.min(departures.len());
    let mut groups: HashMap<String, Group> = HashMap::new();

    for (di, departure) in departures[..window].iter().enumerate() {
        let refs = self_references(departure);
        for (ni, notice) in departure.notices.iter().enumerate() {
            if refs.iter().any(|r| notice.text.contains(r.as_str())) {
                continue;
            }
            let group = groups.entry(notice.text.clone()).or_default();
            group.lines.insert(departure.display_line().to_string());
            group.positions.push((di, ni));
        }
    }

    for (text, group) in &groups {
        let prefix = group.lines.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        for &(di, ni) in &group.positions {
            departures[di].notices[ni].text = format!("{prefix}: {text}");
        }
    }

    let mut visible_notice = false;
    for (di, departure) in departures.iter_mut().enumerate() {
        for notice in &mut departure.notices {
            if di < window {
                visible_notice = true;
            }
            notice.category = NoticeCategory::Info;
            notice.grouped = true;
        }
    }
    visible_notice
}
