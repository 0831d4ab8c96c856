//! Slack Web API error types.
//!
//! Every outbound failure is fatal for the current request: the relay never
//! retries, so the variants only need to say where the call failed.

use thiserror::Error;

/// An error from a single Slack Web API call.
#[derive(Debug, Error)]
pub enum SlackApiError {
    /// The request never produced an HTTP response (connect, TLS, timeout).
    #[error("slack {method} transport error: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Slack answered with a non-success HTTP status.
    #[error("slack {method} returned HTTP {status}")]
    Status { method: &'static str, status: u16 },

    /// Slack answered `{"ok": false, "error": ...}`.
    #[error("slack {method} failed: {error}")]
    Api { method: &'static str, error: String },

    /// The response was `ok` but lacked a field the caller needs.
    #[error("slack {method} response missing {field}")]
    MissingField {
        method: &'static str,
        field: &'static str,
    },
}

impl SlackApiError {
    /// Builds an `Api` error from an optional Slack error code.
    pub fn api(method: &'static str, error: Option<String>) -> Self {
        SlackApiError::Api {
            method,
            error: error.unwrap_or_else(|| "unknown error".to_string()),
        }
    }

    /// Returns the Slack error code for `Api` errors (e.g. `message_not_found`).
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            SlackApiError::Api { error, .. } => Some(error),
            _ => None,
        }
    }
}
