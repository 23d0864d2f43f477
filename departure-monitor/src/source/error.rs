//! Source adapter error types.

/// Errors a source adapter can fail with.
///
/// Every variant is retried the same way by the runner. The split between
/// transient and unexpected failures only changes how loudly a failed
/// attempt is logged.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Network failure or timeout
    #[error("transient failure: {0}")]
    Transient(String),

    /// Upstream answered with a non-success status
    #[error("upstream returned status {status}")]
    Status { status: u16 },

    /// Upstream answered with something we could not read
    #[error("malformed response: {message}")]
    Malformed {
        message: String,
        body: Option<String>,
    },

    /// Local I/O failed (file-backed sources)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdapterError {
    /// Build a `Malformed` error, keeping at most 500 characters of the body.
    pub fn malformed(message: impl Into<String>, body: Option<&str>) -> Self {
        AdapterError::Malformed {
            message: message.into(),
            body: body.map(|b| b.chars().take(500).collect()),
        }
    }

    /// Whether this is an expected, network-level failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, AdapterError::Transient(_) | AdapterError::Status { .. })
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AdapterError::malformed(err.to_string(), None)
        } else if let Some(status) = err.status() {
            AdapterError::Status {
                status: status.as_u16(),
            }
        } else {
            AdapterError::Transient(err.to_string())
        }
    }
}
