//! Rider-facing notices.
//!
//! A notice is one line of text with a symbolic category. It is either
//! attached to a single departure (per-trip notice) or returned loose as a
//! system-wide notice.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbolic category of a notice, used by the renderer to pick a symbol.
///
/// The wire tags are short lowercase strings (`info`, `delay`, `earlyterm`,
/// `nort`, `nodeps`). Tags the engine does not know, such as those sent by a
/// message server, are kept verbatim in [`NoticeCategory::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoticeCategory {
    /// General information, including every upstream per-trip notice.
    Info,
    /// A departure pushed off-screen by a delay.
    Delay,
    /// A trip that does not run its full planned route.
    EarlyTermination,
    /// No departure carries real-time data.
    NoRealtime,
    /// There are no departures at all.
    NoDepartures,
    /// Any other tag.
    Other(String),
}

impl NoticeCategory {
    /// The wire tag for this category.
    pub fn as_str(&self) -> &str {
        match self {
            NoticeCategory::Info => "info",
            NoticeCategory::Delay => "delay",
            NoticeCategory::EarlyTermination => "earlyterm",
            NoticeCategory::NoRealtime => "nort",
            NoticeCategory::NoDepartures => "nodeps",
            NoticeCategory::Other(tag) => tag,
        }
    }
}

impl From<&str> for NoticeCategory {
    fn from(tag: &str) -> Self {
        match tag {
            "info" => NoticeCategory::Info,
            "delay" => NoticeCategory::Delay,
            "earlyterm" => NoticeCategory::EarlyTermination,
            "nort" => NoticeCategory::NoRealtime,
            "nodeps" => NoticeCategory::NoDepartures,
            other => NoticeCategory::Other(other.to_string()),
        }
    }
}

impl From<String> for NoticeCategory {
    fn from(tag: String) -> Self {
        NoticeCategory::from(tag.as_str())
    }
}

impl From<NoticeCategory> for String {
    fn from(category: NoticeCategory) -> Self {
        match category {
            NoticeCategory::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for NoticeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rider-facing text line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Symbolic category.
    pub category: NoticeCategory,
    /// Display text.
    pub text: String,
    /// Set once line deduplication has processed this notice.
    #[serde(default)]
    pub grouped: bool,
}

impl Notice {
    /// Create an ungrouped notice.
    pub fn new(category: impl Into<NoticeCategory>, text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
            grouped: false,
        }
    }

    /// Create an ungrouped `info` notice.
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(NoticeCategory::Info, text)
    }
}
