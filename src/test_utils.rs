//! Shared test doubles: a manually advanced clock and a recording Slack API.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use crate::slack::{OutboundAttachment, SlackApi, SlackApiError};
use crate::store::Clock;
use crate::types::{ChannelId, InboundEvent, MessageReference, Profile, UserId};

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        ManualClock {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        ManualClock::at(Utc.timestamp_opt(1_355_517_523, 0).unwrap())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// A call observed by [`MockSlack`].
#[derive(Debug, Clone, PartialEq)]
pub enum SlackCall {
    PostMessage {
        channel: ChannelId,
        attachment: OutboundAttachment,
    },
    DeleteMessage(MessageReference),
    GetProfile(UserId),
    TeamDomain,
}

/// A [`SlackApi`] that records calls and answers from canned data.
#[derive(Default)]
pub struct MockSlack {
    calls: Mutex<Vec<SlackCall>>,
    published_ts: Mutex<Vec<String>>,
    profiles: HashMap<UserId, Profile>,
    domain: Option<String>,
    fail_post: bool,
    fail_delete: bool,
}

impl MockSlack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the `ts` returned by the next successful `post_message`.
    pub fn with_published_ts(self, ts: &str) -> Self {
        self.published_ts.lock().unwrap().push(ts.to_string());
        self
    }

    pub fn with_profile(mut self, user: &str, profile: Profile) -> Self {
        self.profiles.insert(UserId::new(user), profile);
        self
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }

    pub fn failing_post(mut self) -> Self {
        self.fail_post = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn calls(&self) -> Vec<SlackCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn posted(&self) -> Vec<(ChannelId, OutboundAttachment)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SlackCall::PostMessage {
                    channel,
                    attachment,
                } => Some((channel, attachment)),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageReference> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SlackCall::DeleteMessage(reference) => Some(reference),
                _ => None,
            })
            .collect()
    }

    pub fn profile_fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, SlackCall::GetProfile(_)))
            .count()
    }

    fn record(&self, call: SlackCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SlackApi for MockSlack {
    async fn post_message(
        &self,
        channel: &ChannelId,
        attachment: &OutboundAttachment,
    ) -> Result<MessageReference, SlackApiError> {
        self.record(SlackCall::PostMessage {
            channel: channel.clone(),
            attachment: attachment.clone(),
        });
        if self.fail_post {
            return Err(SlackApiError::api(
                "chat.postMessage",
                Some("channel_not_found".into()),
            ));
        }
        let ts = {
            let mut queued = self.published_ts.lock().unwrap();
            if queued.is_empty() {
                "9999999999.000001".to_string()
            } else {
                queued.remove(0)
            }
        };
        Ok(MessageReference::new(channel.clone(), ts))
    }

    async fn delete_message(&self, message: &MessageReference) -> Result<(), SlackApiError> {
        self.record(SlackCall::DeleteMessage(message.clone()));
        if self.fail_delete {
            return Err(SlackApiError::api(
                "chat.delete",
                Some("message_not_found".into()),
            ));
        }
        Ok(())
    }

    async fn get_profile(&self, user: &UserId) -> Result<Profile, SlackApiError> {
        self.record(SlackCall::GetProfile(user.clone()));
        self.profiles
            .get(user)
            .cloned()
            .ok_or_else(|| SlackApiError::api("users.profile.get", Some("user_not_found".into())))
    }

    async fn team_domain(&self) -> Result<String, SlackApiError> {
        self.record(SlackCall::TeamDomain);
        self.domain
            .clone()
            .ok_or_else(|| SlackApiError::api("team.info", Some("missing_scope".into())))
    }
}

/// A plain `message` event from `user` in `channel`.
pub fn message_event(channel: &str, user: &str, ts: &str, text: &str) -> InboundEvent {
    InboundEvent {
        event_type: "message".into(),
        channel: ChannelId::new(channel),
        user: Some(UserId::new(user)),
        text: Some(text.to_string()),
        ts: ts.into(),
        ..Default::default()
    }
}

/// A `message_deleted` event removing `deleted_ts` from `channel`.
pub fn deleted_event(channel: &str, author: &str, deleted_ts: &str) -> InboundEvent {
    InboundEvent {
        event_type: "message".into(),
        subtype: Some("message_deleted".into()),
        channel: ChannelId::new(channel),
        ts: "9999999999.999999".into(),
        deleted_ts: Some(deleted_ts.into()),
        previous_message: Some(crate::types::PreviousMessage {
            user: Some(UserId::new(author)),
            bot_id: None,
            ts: Some(deleted_ts.into()),
        }),
        ..Default::default()
    }
}
