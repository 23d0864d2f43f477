//! Shared helpers for unit tests: a scripted source adapter and
//! departure builders.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use futures::future::BoxFuture;

use crate::domain::{Departure, ModeOfTransport};
use crate::source::{AdapterError, SourceAdapter, SourceData};

/// Base date used by every test timestamp.
const DATE: &str = "2024-03-15";

/// Timestamp on the test date in UTC+1.
pub(crate) fn at(hhmm: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(&format!("{DATE}T{hhmm}:00+01:00")).unwrap()
}

/// Timestamp with seconds on the test date in UTC+1.
pub(crate) fn at_secs(hhmmss: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(&format!("{DATE}T{hhmmss}+01:00")).unwrap()
}

/// A raw, on-time, real-time departure as an adapter would produce it.
pub(crate) fn departure(line: &str, direction: &str, hhmm: &str) -> Departure {
    let t = at(hhmm);
    Departure::new(line, direction, t, t, true)
}

/// A departure that already went through enrichment.
pub(crate) fn enriched(line: &str, direction: &str, countdown: i64) -> Departure {
    let t = at("10:00") + chrono::Duration::minutes(countdown);
    let mut dep = Departure::new(line, direction, t, t, true);
    dep.disp_countdown = Some(countdown);
    dep.disp_line_number = Some(line.to_string());
    dep.disp_direction = Some(direction.to_string());
    dep.mode = Some(ModeOfTransport::Bus);
    dep.delay = Some(0);
    dep
}

/// Ordered record of adapter calls, shareable between adapters.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a call and return how many times this entry has been seen.
    fn record(&self, entry: String) -> usize {
        let mut entries = self.0.lock().unwrap();
        entries.push(entry.clone());
        entries.iter().filter(|e| **e == entry).count()
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }

    pub(crate) fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Scripted behaviour for one parameter key.
#[derive(Debug, Clone)]
pub(crate) struct Script {
    failures: u32,
    data: Option<SourceData>,
    transient: bool,
    delay: Duration,
}

impl Script {
    /// Succeed on the first attempt.
    pub(crate) fn ok(data: SourceData) -> Self {
        Self {
            failures: 0,
            data: Some(data),
            transient: true,
            delay: Duration::ZERO,
        }
    }

    /// Fail `failures` times, then succeed.
    pub(crate) fn flaky(failures: u32, data: SourceData) -> Self {
        Self {
            failures,
            ..Self::ok(data)
        }
    }

    /// Fail on every attempt.
    pub(crate) fn always_fails() -> Self {
        Self {
            failures: u32::MAX,
            data: None,
            transient: true,
            delay: Duration::ZERO,
        }
    }

    /// Fail with a non-transient error instead.
    pub(crate) fn unexpected(mut self) -> Self {
        self.transient = false;
        self
    }

    /// Take `delay` before answering.
    pub(crate) fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Adapter whose answers are scripted per parameter key.
///
/// Parameters are plain strings; a key without a script fails with a
/// malformed-response error.
#[derive(Debug)]
pub(crate) struct ScriptedAdapter {
    name: String,
    scripts: HashMap<String, Script>,
    log: CallLog,
}

impl ScriptedAdapter {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            scripts: HashMap::new(),
            log: CallLog::new(),
        }
    }

    pub(crate) fn on(mut self, key: &str, script: Script) -> Self {
        self.scripts.insert(key.to_string(), script);
        self
    }

    pub(crate) fn with_log(mut self, log: &CallLog) -> Self {
        self.log = log.clone();
        self
    }
}

impl SourceAdapter for ScriptedAdapter {
    type Params = String;

    fn name(&self) -> &str {
        &self.name
    }

    fn fetch<'a>(&'a self, params: &'a String) -> BoxFuture<'a, Result<SourceData, AdapterError>> {
        Box::pin(async move {
            let seen = self.log.record(format!("{}:{}", self.name, params));
            let Some(script) = self.scripts.get(params) else {
                return Err(AdapterError::malformed("no script for parameters", None));
            };
            if !script.delay.is_zero() {
                tokio::time::sleep(script.delay).await;
            }
            match &script.data {
                Some(data) if seen > script.failures as usize => Ok(data.clone()),
                _ if script.transient => Err(AdapterError::Transient("scripted failure".into())),
                _ => Err(AdapterError::malformed("scripted failure", Some("<garbage>"))),
            }
        })
    }
}
