//! Events API envelope parsing.
//!
//! Every request Slack sends to the events endpoint is a JSON envelope:
//!
//! - `url_verification` - a handshake; the `challenge` must be echoed back
//! - `event_callback` - wraps one event plus its unique `event_id`
//!
//! Other envelope types (e.g. `app_rate_limited`) are reported as unknown.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{EventId, SlackEvent};

/// Error type for envelope parsing failures.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// JSON deserialization failed (includes a missing `type`).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A field required by the envelope type is absent.
    #[error("{envelope_type} envelope missing {field}")]
    MissingField {
        envelope_type: &'static str,
        field: &'static str,
    },
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    envelope_type: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    challenge: Option<String>,
    #[serde(default)]
    event_id: Option<EventId>,
    #[serde(default)]
    event: Option<serde_json::Value>,
}

/// The body of an Events API envelope, by type.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeKind {
    UrlVerification { challenge: String },
    EventCallback { event_id: EventId, event: SlackEvent },
    Unknown { envelope_type: String },
}

/// A parsed envelope with its verification token.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// The legacy verification token Slack includes in every envelope.
    pub token: Option<String>,
    pub kind: EnvelopeKind,
}

impl Envelope {
    /// Returns `true` if the envelope's token equals `expected`.
    pub fn token_matches(&self, expected: &str) -> bool {
        self.token.as_deref() == Some(expected)
    }
}

/// Parses a raw request body into an [`Envelope`].
///
/// # Examples
///
/// ```
/// use slack_relay::webhooks::{EnvelopeKind, parse_envelope};
///
/// let body = br#"{"type": "url_verification", "token": "t", "challenge": "abc"}"#;
/// let envelope = parse_envelope(body).unwrap();
/// assert_eq!(
///     envelope.kind,
///     EnvelopeKind::UrlVerification { challenge: "abc".into() }
/// );
/// ```
pub fn parse_envelope(body: &[u8]) -> Result<Envelope, EnvelopeError> {
    let raw: RawEnvelope = serde_json::from_slice(body)?;

    let kind = match raw.envelope_type.as_str() {
        "url_verification" => EnvelopeKind::UrlVerification {
            challenge: raw.challenge.ok_or(EnvelopeError::MissingField {
                envelope_type: "url_verification",
                field: "challenge",
            })?,
        },
        "event_callback" => EnvelopeKind::EventCallback {
            event_id: raw.event_id.ok_or(EnvelopeError::MissingField {
                envelope_type: "event_callback",
                field: "event_id",
            })?,
            event: SlackEvent::from_value(raw.event.ok_or(EnvelopeError::MissingField {
                envelope_type: "event_callback",
                field: "event",
            })?)?,
        },
        _ => EnvelopeKind::Unknown {
            envelope_type: raw.envelope_type,
        },
    };

    Ok(Envelope {
        token: raw.token,
        kind,
    })
}
