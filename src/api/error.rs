//! Errors returned by the account service client.

use serde_json::Value;
use thiserror::Error;

/// Failure talking to the account service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (connection refused, TLS, timeout...)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status. `message` is safe to show to users.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The success body did not match the expected shape
    #[error("Invalid response from service: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status code, if the service responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }
}

/// Extract a human-readable message from a failure body.
///
/// The service reports errors as `{"detail": ...}` where `detail` is either a plain string or an
/// object carrying `error` or `message`. Anything else (including a body that is not JSON)
/// yields `default`, so structured values are never stringified into the message.
pub fn extract_error_message(body: &[u8], default: &str) -> String {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return default.to_string();
    };

    let message = match value.get("detail") {
        Some(Value::String(detail)) => Some(detail.as_str()),
        Some(Value::Object(detail)) => ["error", "message"].iter().find_map(|key| detail.get(*key).and_then(Value::as_str).filter(|s| !s.is_empty())),
        _ => None,
    };

    message.unwrap_or(default).to_string()
}
