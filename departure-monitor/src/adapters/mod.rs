//! Source adapters for concrete backends.
//!
//! - [`dbrest`]: departures from db-rest servers (FPTF JSON)
//! - [`messages`]: operator messages and display settings from a message server
//! - [`file`]: departures from a saved db-rest response on disk

pub mod dbrest;
pub mod file;
pub mod messages;

use crate::source::AdapterError;

/// HTTP client for the network adapters, identifying the monitor.
pub fn http_client() -> Result<reqwest::Client, AdapterError> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("departure-monitor/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(http)
}
