//! Events API endpoint handler.
//!
//! Authenticates the delivery, unwraps the envelope and hands event callbacks
//! to the [`Relay`](crate::relay::Relay). Everything happens within the
//! request; the response body reports what was done.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::AppState;
use crate::relay::RelayError;
use crate::slack::SlackApi;
use crate::store::KvStore;
use crate::webhooks::{EnvelopeError, EnvelopeKind, parse_envelope, verify_signature};

/// Header carrying the `v0=<hex>` request signature.
pub const HEADER_SIGNATURE: &str = "x-slack-signature";
/// Header carrying the unix-seconds request timestamp.
pub const HEADER_TIMESTAMP: &str = "x-slack-request-timestamp";

/// Errors that end webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Bad signature, or a timestamp outside the replay window.
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid verification token")]
    InvalidToken,

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(#[from] EnvelopeError),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidToken => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidEnvelope(_) => StatusCode::BAD_REQUEST,
            WebhookError::Relay(RelayError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            WebhookError::Relay(_) => StatusCode::BAD_GATEWAY,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Events API handler.
///
/// # Response
///
/// - 200: `{"challenge": ...}` for `url_verification`, the relay outcome for
///   `event_callback`, `{"unknown event": type}` otherwise
/// - 400: missing header or malformed envelope
/// - 401: bad signature, stale timestamp or wrong verification token
/// - 500: store failure
/// - 502: Slack rejected the publish or delete
pub async fn webhook_handler<S, A>(
    State(app_state): State<AppState<S, A>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError>
where
    S: KvStore + Clone + Send + Sync + 'static,
    A: SlackApi + Send + Sync + 'static,
{
    let signature = get_header(&headers, HEADER_SIGNATURE)?;
    let timestamp = get_header(&headers, HEADER_TIMESTAMP)?;

    // Verify signature BEFORE any parsing.
    let now = app_state.clock().now();
    if !verify_signature(signature, timestamp, &body, app_state.signing_secret(), now) {
        warn!(timestamp = %timestamp, "Rejected request signature");
        return Err(WebhookError::InvalidSignature);
    }

    let envelope = parse_envelope(&body)?;
    if !envelope.token_matches(app_state.verification_token()) {
        warn!("Verification token mismatch");
        return Err(WebhookError::InvalidToken);
    }

    match envelope.kind {
        EnvelopeKind::UrlVerification { challenge } => {
            info!("Answering url_verification");
            Ok(Json(json!({ "challenge": challenge })).into_response())
        }
        EnvelopeKind::EventCallback { event_id, event } => {
            debug!(
                event_id = %event_id,
                event_type = event.event_type(),
                "Received event callback"
            );
            let outcome = app_state.relay().handle_event(&event_id, event).await?;
            Ok(Json(outcome).into_response())
        }
        EnvelopeKind::Unknown { envelope_type } => {
            warn!(envelope_type = %envelope_type, "Unknown envelope type");
            Ok(Json(json!({ "unknown event": envelope_type })).into_response())
        }
    }
}

fn get_header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingHeader(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::SlackApiError;
    use crate::store::StoreError;
    use crate::types::MessageReference;

    #[test]
    fn get_header_present() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_TIMESTAMP, "1531420618".parse().unwrap());

        assert_eq!(get_header(&headers, HEADER_TIMESTAMP).unwrap(), "1531420618");
    }

    #[test]
    fn get_header_missing() {
        let headers = HeaderMap::new();

        let result = get_header(&headers, HEADER_SIGNATURE);
        assert!(matches!(result, Err(WebhookError::MissingHeader(HEADER_SIGNATURE))));
    }

    #[test]
    fn error_status_mapping() {
        let status = |e: WebhookError| e.into_response().status();

        assert_eq!(status(WebhookError::MissingHeader(HEADER_SIGNATURE)), StatusCode::BAD_REQUEST);
        assert_eq!(status(WebhookError::InvalidSignature), StatusCode::UNAUTHORIZED);
        assert_eq!(status(WebhookError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status(WebhookError::InvalidEnvelope(EnvelopeError::MissingField {
                envelope_type: "event_callback",
                field: "event",
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(WebhookError::Relay(RelayError::Publish(SlackApiError::api(
                "chat.postMessage",
                None
            )))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(WebhookError::Relay(RelayError::Unpublish {
                destination: MessageReference::new("C2", "1"),
                source: SlackApiError::api("chat.delete", None),
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(WebhookError::Relay(RelayError::Store(StoreError::Unavailable(
                "down".into()
            )))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
