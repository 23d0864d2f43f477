//! Display message server adapter.
//!
//! A message server hands each display its operator messages, a small
//! configuration object and optionally a control command:
//!
//! ```json
//! {
//!     "messages": [["info", "Testinformation"], ["ad", "Testwerbung"]],
//!     "config": {"brightness": 15},
//!     "command": "shutdown 19:30"
//! }
//! ```
//!
//! Messages become loose notices. The configuration object becomes side
//! data, and the command is passed through under [`COMMAND_KEY`] for the
//! caller to interpret.

use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::adapters::http_client;
use crate::domain::Notice;
use crate::source::{AdapterError, SideData, SourceAdapter, SourceData};

/// Side-data key carrying the control command.
pub const COMMAND_KEY: &str = "command";

/// Where to find one display's messages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageServerParams {
    /// Server base URL
    pub server_url: String,
    /// Display id appended to the URL
    pub display_id: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    5
}

impl MessageServerParams {
    pub fn new(server_url: impl Into<String>, display_id: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            display_id: display_id.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            self.display_id
        )
    }
}

/// Body returned by a message server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    /// `[symbol, text]` pairs
    pub messages: Option<Vec<(String, String)>>,
    pub config: Option<serde_json::Map<String, Value>>,
    pub command: Option<String>,
}

/// Turn a message server response into source data.
pub fn convert_response(response: MessageResponse) -> SourceData {
    let notices = response
        .messages
        .unwrap_or_default()
        .into_iter()
        .map(|(symbol, text)| Notice::new(symbol, text))
        .collect();

    let mut side_data: SideData = response.config.unwrap_or_default();
    if let Some(command) = response.command
        && !command.is_empty()
    {
        side_data.insert(COMMAND_KEY.to_string(), Value::String(command));
    }

    SourceData::new(Vec::new(), notices, side_data)
}

/// Adapter for display message servers.
#[derive(Debug, Clone)]
pub struct MessageServerAdapter {
    http: reqwest::Client,
}

impl MessageServerAdapter {
    /// Create an adapter with its own HTTP client.
    pub fn new() -> Result<Self, AdapterError> {
        Ok(Self {
            http: http_client()?,
        })
    }

    /// Create an adapter sharing an existing HTTP client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch one display's messages.
    ///
    /// A display unknown to the server (404) has no messages; that is not
    /// a failure.
    pub async fn messages(&self, params: &MessageServerParams) -> Result<SourceData, AdapterError> {
        let url = params.url();
        let response = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(params.timeout_secs))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            warn!(url = %url, "message server does not know this display, returning nothing");
            return Ok(SourceData::default());
        }
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: MessageResponse = serde_json::from_str(&body)
            .map_err(|e| AdapterError::malformed(e.to_string(), Some(&body)))?;

        let data = convert_response(parsed);
        debug!(
            display = %params.display_id,
            messages = data.notices.len(),
            side_data = data.side_data.len(),
            "fetched display messages"
        );
        Ok(data)
    }
}

impl SourceAdapter for MessageServerAdapter {
    type Params = MessageServerParams;

    fn name(&self) -> &str {
        "message-server"
    }

    fn fetch<'a>(
        &'a self,
        params: &'a MessageServerParams,
    ) -> BoxFuture<'a, Result<SourceData, AdapterError>> {
        Box::pin(self.messages(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NoticeCategory;
    use serde_json::json;

    fn parse(json: &str) -> MessageResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn full_response() {
        let data = convert_response(parse(
            r#"{
                "messages": [["info", "Testinformation"], ["ad", "Testwerbung"]],
                "config": {"brightness": 15},
                "command": "shutdown 19:30"
            }"#,
        ));

        assert!(data.departures.is_empty());
        assert_eq!(data.notices.len(), 2);
        assert_eq!(data.notices[0], Notice::info("Testinformation"));
        assert_eq!(data.notices[1].category, NoticeCategory::Other("ad".into()));
        assert_eq!(data.side_data.get("brightness"), Some(&json!(15)));
        assert_eq!(data.side_data.get(COMMAND_KEY), Some(&json!("shutdown 19:30")));
    }

    #[test]
    fn empty_response() {
        let data = convert_response(parse(r#"{"command": ""}"#));
        assert_eq!(data, SourceData::default());
    }

    #[test]
    fn bad_message_shape_is_rejected() {
        assert!(serde_json::from_str::<MessageResponse>(r#"{"messages": ["info"]}"#).is_err());
    }

    #[test]
    fn url_joins_display_id() {
        let params = MessageServerParams::new("https://msg.example.org/", "dfi-7").with_timeout(2);
        assert_eq!(params.url(), "https://msg.example.org/dfi-7");
        assert_eq!(params.timeout_secs, 2);
    }
}
