//! HTTP server for the relay.
//!
//! # Endpoints
//!
//! - `POST /slack/events` - Events API deliveries (signed by Slack)
//! - `GET /health` - Returns 200 if the server is running

use std::sync::Arc;

use tower_http::trace::TraceLayer;

use crate::relay::Relay;
use crate::slack::SlackApi;
use crate::store::{Clock, KvStore};

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::{HEADER_SIGNATURE, HEADER_TIMESTAMP, WebhookError, webhook_handler};

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
pub struct AppState<S, A> {
    inner: Arc<AppStateInner<S, A>>,
}

struct AppStateInner<S, A> {
    relay: Relay<S, A>,

    /// Signing secret for `v0` request signatures.
    signing_secret: Vec<u8>,

    /// Legacy verification token every envelope must carry.
    verification_token: String,

    clock: Arc<dyn Clock>,
}

impl<S, A> Clone for AppState<S, A> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A> AppState<S, A> {
    pub fn new(
        relay: Relay<S, A>,
        signing_secret: impl Into<Vec<u8>>,
        verification_token: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                relay,
                signing_secret: signing_secret.into(),
                verification_token: verification_token.into(),
                clock,
            }),
        }
    }

    pub fn relay(&self) -> &Relay<S, A> {
        &self.inner.relay
    }

    pub fn signing_secret(&self) -> &[u8] {
        &self.inner.signing_secret
    }

    pub fn verification_token(&self) -> &str {
        &self.inner.verification_token
    }

    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<S, A>(app_state: AppState<S, A>) -> axum::Router
where
    S: KvStore + Clone + Send + Sync + 'static,
    A: SlackApi + Send + Sync + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/slack/events", post(webhook_handler::<S, A>))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::relay::RelaySettings;
    use crate::store::MemoryStore;
    use crate::test_utils::{ManualClock, MockSlack};
    use crate::types::{ChannelId, UserId};
    use crate::webhooks::{compute_signature, format_signature_header};

    const SECRET: &[u8] = b"8f742231b10e8888abcd99yyyzzz85a5";
    const TOKEN: &str = "Jhj5dZrVaK7ZwHHjRyZWjbDl";
    /// Matches `ManualClock::default()`.
    const NOW: &str = "1355517523";

    struct Harness {
        state: AppState<MemoryStore, MockSlack>,
        slack: Arc<MockSlack>,
        clock: Arc<ManualClock>,
    }

    fn harness(slack: MockSlack) -> Harness {
        let clock = Arc::new(ManualClock::default());
        let store = MemoryStore::with_clock(chrono::Duration::hours(6), clock.clone());
        harness_with(slack, store, clock)
    }

    fn harness_with(slack: MockSlack, store: MemoryStore, clock: Arc<ManualClock>) -> Harness {
        let slack = Arc::new(slack);
        let settings = RelaySettings {
            destination_channel: ChannelId::new("C2"),
            bot_user_id: UserId::new("UBOT"),
            bot_id: None,
            workspace_domain: Some("ghostbusters".into()),
        };
        let relay = Relay::new(settings, store, slack.clone());
        let state = AppState::new(relay, SECRET, TOKEN, clock.clone());
        Harness { state, slack, clock }
    }

    fn signed_request(secret: &[u8], timestamp: &str, body: &Value) -> Request<Body> {
        let body_bytes = serde_json::to_vec(body).unwrap();
        let signature = compute_signature("v0", timestamp, &body_bytes, secret);

        Request::builder()
            .method("POST")
            .uri("/slack/events")
            .header("content-type", "application/json")
            .header(HEADER_SIGNATURE, format_signature_header(&signature))
            .header(HEADER_TIMESTAMP, timestamp)
            .body(Body::from(body_bytes))
            .unwrap()
    }

    fn event_callback(event_id: &str, event: Value) -> Value {
        json!({
            "token": TOKEN,
            "team_id": "T1",
            "type": "event_callback",
            "event_id": event_id,
            "event_time": 1355517523,
            "event": event,
        })
    }

    async fn send(state: &AppState<MemoryStore, MockSlack>, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    // ─── Health endpoint ───

    #[tokio::test]
    async fn health_returns_200() {
        let h = harness(MockSlack::new());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = send(&h.state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    // ─── Authentication ───

    #[tokio::test]
    async fn url_verification_echoes_challenge() {
        let h = harness(MockSlack::new());
        let body = json!({"token": TOKEN, "type": "url_verification", "challenge": "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"});

        let (status, body) = send(&h.state, signed_request(SECRET, NOW, &body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"challenge": "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"})
        );
    }

    #[tokio::test]
    async fn wrong_secret_returns_401() {
        let h = harness(MockSlack::new());
        let body = json!({"token": TOKEN, "type": "url_verification", "challenge": "c"});

        let (status, _) = send(&h.state, signed_request(b"wrong-secret", NOW, &body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn stale_timestamp_returns_401() {
        let h = harness(MockSlack::new());
        let body = json!({"token": TOKEN, "type": "url_verification", "challenge": "c"});
        let request = signed_request(SECRET, NOW, &body);

        h.clock.advance(chrono::Duration::seconds(61));
        let (status, _) = send(&h.state, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_headers_return_400() {
        let h = harness(MockSlack::new());
        let request = Request::builder()
            .method("POST")
            .uri("/slack/events")
            .body(Body::from("{}"))
            .unwrap();

        let (status, body) = send(&h.state, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains(HEADER_SIGNATURE));
    }

    #[tokio::test]
    async fn wrong_verification_token_returns_401() {
        let h = harness(MockSlack::new());
        let body = json!({"token": "nope", "type": "url_verification", "challenge": "c"});

        let (status, _) = send(&h.state, signed_request(SECRET, NOW, &body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_envelope_returns_400() {
        let h = harness(MockSlack::new());
        let body = json!({"token": TOKEN});

        let (status, _) = send(&h.state, signed_request(SECRET, NOW, &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_envelope_type_is_reported() {
        let h = harness(MockSlack::new());
        let body = json!({"token": TOKEN, "type": "app_rate_limited"});

        let (status, body) = send(&h.state, signed_request(SECRET, NOW, &body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"unknown event": "app_rate_limited"}));
    }

    // ─── Relay ───

    #[tokio::test]
    async fn message_event_is_posted() {
        let h = harness(MockSlack::new());
        let body = event_callback(
            "Ev1",
            json!({"type": "message", "channel": "C1", "user": "U1", "text": "Hello world", "ts": "1355517523.000005"}),
        );

        let (status, body) = send(&h.state, signed_request(SECRET, NOW, &body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["posted"]["text"], "Hello world");
        assert_eq!(
            body["posted"]["footer"],
            "Posted in <#C1> @ https://ghostbusters.slack.com/archives/C1/p1355517523.000005"
        );
        assert_eq!(h.slack.posted().len(), 1);
    }

    #[tokio::test]
    async fn redelivery_is_duplicated() {
        let h = harness(MockSlack::new());
        let body = event_callback(
            "Ev1",
            json!({"type": "message", "channel": "C1", "user": "U1", "text": "hi", "ts": "1.0"}),
        );

        send(&h.state, signed_request(SECRET, NOW, &body)).await;
        let (status, body) = send(&h.state, signed_request(SECRET, NOW, &body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"duplicated": "Ev1"}));
        assert_eq!(h.slack.posted().len(), 1);
    }

    #[tokio::test]
    async fn non_message_event_is_unsupported() {
        let h = harness(MockSlack::new());
        let body = event_callback("Ev1", json!({"type": "reaction_added", "user": "U1"}));

        let (status, body) = send(&h.state, signed_request(SECRET, NOW, &body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["unsupported"]["type"], "reaction_added");
        assert!(h.slack.calls().is_empty());
    }

    #[tokio::test]
    async fn delete_propagates_to_relayed_copy() {
        let h = harness(MockSlack::new().with_published_ts("222"));
        let post = event_callback(
            "Ev1",
            json!({"type": "message", "channel": "C1", "user": "U1", "text": "hi", "ts": "111"}),
        );
        let delete = event_callback(
            "Ev2",
            json!({
                "type": "message",
                "subtype": "message_deleted",
                "channel": "C1",
                "ts": "333",
                "deleted_ts": "111",
                "previous_message": {"type": "message", "user": "U1", "text": "hi", "ts": "111"}
            }),
        );

        send(&h.state, signed_request(SECRET, NOW, &post)).await;
        let (status, body) = send(&h.state, signed_request(SECRET, NOW, &delete)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"deleted": {"channel": "C2", "ts": "222"}}));
    }

    #[tokio::test]
    async fn events_with_object_fields_are_unsupported() {
        let h = harness(MockSlack::new());
        let team_join = event_callback(
            "Ev1",
            json!({"type": "team_join", "user": {"id": "U9", "profile": {"real_name": "Slimer"}}}),
        );
        let channel_created = event_callback(
            "Ev2",
            json!({"type": "channel_created", "channel": {"id": "C9", "name": "ecto", "creator": "U1"}}),
        );

        let (status, body) = send(&h.state, signed_request(SECRET, NOW, &team_join)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["unsupported"]["user"]["id"], "U9");

        let (status, body) = send(&h.state, signed_request(SECRET, NOW, &channel_created)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["unsupported"]["channel"]["id"], "C9");

        assert!(h.slack.calls().is_empty());
    }

    #[tokio::test]
    async fn store_failure_returns_500() {
        let clock = Arc::new(ManualClock::default());
        let store = MemoryStore::with_clock(chrono::Duration::hours(6), clock.clone());
        store.poison();
        let h = harness_with(MockSlack::new(), store, clock);
        let body = event_callback(
            "Ev1",
            json!({"type": "message", "channel": "C1", "user": "U1", "text": "hi", "ts": "1.0"}),
        );

        let (status, body) = send(&h.state, signed_request(SECRET, NOW, &body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("store unavailable"));
        assert!(h.slack.calls().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_returns_502() {
        let h = harness(MockSlack::new().failing_post());
        let body = event_callback(
            "Ev1",
            json!({"type": "message", "channel": "C1", "user": "U1", "text": "hi", "ts": "1.0"}),
        );

        let (status, body) = send(&h.state, signed_request(SECRET, NOW, &body)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("channel_not_found"));
    }
}
