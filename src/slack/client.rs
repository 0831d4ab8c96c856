//! reqwest-backed Slack Web API client.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::error::SlackApiError;
use super::message::{OutboundAttachment, PostMessageRequest};
use super::SlackApi;
use crate::types::{ChannelId, MessageReference, Profile, UserId};

/// Production Slack Web API endpoint.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    channel: Option<String>,
    ts: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteMessageResponse {
    ok: bool,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    ok: bool,
    profile: Option<Profile>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TeamInfoResponse {
    ok: bool,
    team: Option<TeamInfo>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TeamInfo {
    domain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    ok: bool,
    user_id: Option<String>,
    error: Option<String>,
}

/// A Slack Web API client authenticated with a bot token.
///
/// Every call is a single round-trip bounded by the configured timeout; there
/// is no retry.
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl SlackClient {
    /// Creates a client against `api_base` (normally [`DEFAULT_API_BASE`]).
    pub fn new(
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("slack-relay/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(SlackClient {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into().trim().to_string(),
        })
    }

    /// Resolves the user ID the bot token belongs to (`auth.test`).
    pub async fn bot_user_id(&self) -> Result<UserId, SlackApiError> {
        const METHOD: &str = "auth.test";
        let response: AuthTestResponse = self.send(METHOD, self.post(METHOD)).await?;
        if !response.ok {
            return Err(SlackApiError::api(METHOD, response.error));
        }
        response
            .user_id
            .filter(|id| !id.trim().is_empty())
            .map(UserId::new)
            .ok_or(SlackApiError::MissingField {
                method: METHOD,
                field: "user_id",
            })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    fn post(&self, method: &str) -> reqwest::RequestBuilder {
        self.http.post(self.url(method)).bearer_auth(&self.bot_token)
    }

    fn get(&self, method: &str) -> reqwest::RequestBuilder {
        self.http.get(self.url(method)).bearer_auth(&self.bot_token)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SlackApiError> {
        let response = request
            .send()
            .await
            .map_err(|source| SlackApiError::Transport { method, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SlackApiError::Status {
                method,
                status: status.as_u16(),
            });
        }

        debug!(method, status = status.as_u16(), "Slack API call completed");

        response
            .json::<T>()
            .await
            .map_err(|source| SlackApiError::Transport { method, source })
    }
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl SlackApi for SlackClient {
    async fn post_message(
        &self,
        channel: &ChannelId,
        attachment: &OutboundAttachment,
    ) -> Result<MessageReference, SlackApiError> {
        const METHOD: &str = "chat.postMessage";
        let body = PostMessageRequest::new(channel, attachment);
        let response: PostMessageResponse = self.send(METHOD, self.post(METHOD).json(&body)).await?;
        if !response.ok {
            return Err(SlackApiError::api(METHOD, response.error));
        }

        let ts = response.ts.ok_or(SlackApiError::MissingField {
            method: METHOD,
            field: "ts",
        })?;
        let channel = response.channel.unwrap_or_else(|| channel.to_string());
        Ok(MessageReference::new(channel, ts))
    }

    async fn delete_message(&self, message: &MessageReference) -> Result<(), SlackApiError> {
        const METHOD: &str = "chat.delete";
        let body = json!({ "channel": message.channel, "ts": message.ts });
        let response: DeleteMessageResponse =
            self.send(METHOD, self.post(METHOD).json(&body)).await?;
        if !response.ok {
            return Err(SlackApiError::api(METHOD, response.error));
        }
        Ok(())
    }

    async fn get_profile(&self, user: &UserId) -> Result<Profile, SlackApiError> {
        const METHOD: &str = "users.profile.get";
        let request = self.get(METHOD).query(&[("user", user.as_str())]);
        let response: ProfileResponse = self.send(METHOD, request).await?;
        if !response.ok {
            return Err(SlackApiError::api(METHOD, response.error));
        }
        response.profile.ok_or(SlackApiError::MissingField {
            method: METHOD,
            field: "profile",
        })
    }

    async fn team_domain(&self) -> Result<String, SlackApiError> {
        const METHOD: &str = "team.info";
        let response: TeamInfoResponse = self.send(METHOD, self.get(METHOD)).await?;
        if !response.ok {
            return Err(SlackApiError::api(METHOD, response.error));
        }
        response
            .team
            .and_then(|team| team.domain)
            .filter(|domain| !domain.trim().is_empty())
            .ok_or(SlackApiError::MissingField {
                method: METHOD,
                field: "team.domain",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> SlackClient {
        SlackClient::new(server.base_url(), "xoxb-test", Duration::from_secs(2)).unwrap()
    }

    fn attachment() -> OutboundAttachment {
        OutboundAttachment {
            text: "Hello world".into(),
            color: "#36a64f".into(),
            footer: "Posted in <#C1>".into(),
            author_name: Some("<@U1>".into()),
            author_icon: None,
            author_link: None,
            image_url: None,
            ts: Some(1355517523.000005),
        }
    }

    #[tokio::test]
    async fn post_message_returns_published_reference() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat.postMessage")
                .header("authorization", "Bearer xoxb-test")
                .json_body(serde_json::json!({
                    "channel": "C2",
                    "attachments": [{
                        "text": "Hello world",
                        "color": "#36a64f",
                        "footer": "Posted in <#C1>",
                        "author_name": "<@U1>",
                        "ts": 1355517523.000005
                    }],
                    "link_names": true,
                    "mrkdwn": true,
                    "unfurl_links": true
                }));
            then.status(200)
                .json_body(serde_json::json!({"ok": true, "channel": "C2", "ts": "222.000"}));
        });

        let published = client(&server)
            .post_message(&ChannelId::new("C2"), &attachment())
            .await
            .unwrap();

        mock.assert();
        assert_eq!(published, MessageReference::new("C2", "222.000"));
    }

    #[tokio::test]
    async fn post_message_not_ok_is_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat.postMessage");
            then.status(200)
                .json_body(serde_json::json!({"ok": false, "error": "channel_not_found"}));
        });

        let err = client(&server)
            .post_message(&ChannelId::new("C2"), &attachment())
            .await
            .unwrap_err();

        assert_eq!(err.api_error_code(), Some("channel_not_found"));
    }

    #[tokio::test]
    async fn post_message_http_failure_is_status_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat.postMessage");
            then.status(500).body("boom");
        });

        let err = client(&server)
            .post_message(&ChannelId::new("C2"), &attachment())
            .await
            .unwrap_err();

        assert!(matches!(err, SlackApiError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn delete_message_sends_channel_and_ts() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat.delete")
                .json_body(serde_json::json!({"channel": "C2", "ts": "222.000"}));
            then.status(200)
                .json_body(serde_json::json!({"ok": true, "channel": "C2", "ts": "222.000"}));
        });

        client(&server)
            .delete_message(&MessageReference::new("C2", "222.000"))
            .await
            .unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn get_profile_parses_profile() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/users.profile.get")
                .query_param("user", "U1");
            then.status(200).json_body(serde_json::json!({
                "ok": true,
                "profile": {
                    "display_name": "spengler",
                    "real_name": "Egon Spengler",
                    "image_32": "https://example.com/32.png",
                    "status_emoji": ":books:"
                }
            }));
        });

        let profile = client(&server).get_profile(&UserId::new("U1")).await.unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("spengler"));
        assert_eq!(profile.image_32.as_deref(), Some("https://example.com/32.png"));
    }

    #[tokio::test]
    async fn team_domain_reads_team_domain() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/team.info");
            then.status(200).json_body(
                serde_json::json!({"ok": true, "team": {"id": "T1", "domain": "ghostbusters"}}),
            );
        });

        assert_eq!(client(&server).team_domain().await.unwrap(), "ghostbusters");
    }

    #[tokio::test]
    async fn bot_user_id_uses_auth_test() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth.test");
            then.status(200)
                .json_body(serde_json::json!({"ok": true, "user_id": "UBOT"}));
        });

        assert_eq!(
            client(&server).bot_user_id().await.unwrap(),
            UserId::new("UBOT")
        );
    }
}
