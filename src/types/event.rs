//! Slack event payload types.
//!
//! These mirror the subset of the Events API `message` payload the relay reads.
//! Unknown fields are ignored so new Slack fields never break deserialization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::ids::{ChannelId, MessageTs, UserId};

/// Event `type` value for message events.
pub const MESSAGE_EVENT_TYPE: &str = "message";

/// The finer-grained classification of a `message` event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageSubtype {
    /// A plain user message (no `subtype` field).
    None,
    /// A message carrying one or more shared files.
    FileShare,
    /// A thread reply also broadcast to the channel.
    ThreadBroadcast,
    /// The original message was deleted.
    MessageDeleted,
    /// Anything else (`message_changed`, `channel_join`, ...).
    Other(String),
}

impl MessageSubtype {
    pub fn from_field(subtype: Option<&str>) -> Self {
        match subtype {
            None | Some("") => MessageSubtype::None,
            Some("file_share") => MessageSubtype::FileShare,
            Some("thread_broadcast") => MessageSubtype::ThreadBroadcast,
            Some("message_deleted") => MessageSubtype::MessageDeleted,
            Some(other) => MessageSubtype::Other(other.to_string()),
        }
    }
}

/// A file attached to a message event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackFile {
    #[serde(default)]
    pub name: String,

    /// Size in bytes.
    #[serde(default)]
    pub size: u64,

    #[serde(default)]
    pub mimetype: String,

    #[serde(default)]
    pub permalink: String,
}

impl SlackFile {
    pub fn is_image(&self) -> bool {
        self.mimetype.starts_with("image/")
    }
}

/// The prior state of a message, present on `message_deleted` events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<MessageTs>,
}

/// A single inbound Slack event (the `event` field of an `event_callback`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// The event type (`message`, `reaction_added`, ...).
    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    #[serde(default)]
    pub channel: ChannelId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<SlackFile>,

    /// The message timestamp; unique within `channel`.
    #[serde(default)]
    pub ts: MessageTs,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<MessageTs>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_user_id: Option<UserId>,

    /// Timestamp of the deleted message (`message_deleted` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_ts: Option<MessageTs>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_message: Option<PreviousMessage>,
}

impl InboundEvent {
    pub fn is_message(&self) -> bool {
        self.event_type == MESSAGE_EVENT_TYPE
    }

    pub fn message_subtype(&self) -> MessageSubtype {
        MessageSubtype::from_field(self.subtype.as_deref())
    }

    /// Returns the identity that authored the event.
    ///
    /// Deleted messages carry their author in `previous_message`, and bot
    /// messages may carry only a `bot_id`.
    pub fn actor_id(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(UserId::as_str)
            .or(self.bot_id.as_deref())
            .or_else(|| {
                self.previous_message.as_ref().and_then(|prev| {
                    prev.user
                        .as_ref()
                        .map(UserId::as_str)
                        .or(prev.bot_id.as_deref())
                })
            })
    }

    /// Returns the reference to this message in its source channel.
    pub fn message_ref(&self) -> MessageReference {
        MessageReference::new(self.channel.clone(), self.ts.clone())
    }

    /// Returns the reference to the message a `message_deleted` event removed.
    ///
    /// Falls back to `previous_message.ts` when `deleted_ts` is absent.
    pub fn deleted_ref(&self) -> Option<MessageReference> {
        let ts = self
            .deleted_ts
            .clone()
            .or_else(|| self.previous_message.as_ref().and_then(|p| p.ts.clone()))?;
        Some(MessageReference::new(self.channel.clone(), ts))
    }
}

/// The `event` of an `event_callback`.
///
/// Only `message` events are read into [`InboundEvent`]. Every other event type
/// is kept as raw JSON, since fields such as `user` and `channel` are objects
/// on events like `team_join` or `channel_created`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SlackEvent {
    Message(InboundEvent),
    Other(Value),
}

impl SlackEvent {
    /// Reads `value`, deserializing it as a message only when `type` is `message`.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if value.get("type").and_then(Value::as_str) == Some(MESSAGE_EVENT_TYPE) {
            Ok(SlackEvent::Message(serde_json::from_value(value)?))
        } else {
            Ok(SlackEvent::Other(value))
        }
    }

    /// The event's `type`, or `""` if absent.
    pub fn event_type(&self) -> &str {
        match self {
            SlackEvent::Message(event) => &event.event_type,
            SlackEvent::Other(value) => value.get("type").and_then(Value::as_str).unwrap_or(""),
        }
    }
}

impl From<InboundEvent> for SlackEvent {
    fn from(event: InboundEvent) -> Self {
        SlackEvent::Message(event)
    }
}

/// A user's display profile, as returned by `users.profile.get`.
///
/// The same shape is stored in the profile cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_32: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_emoji: Option<String>,
}

/// A `(channel, ts)` pair identifying a message in either workspace space.
///
/// Rendered as `"{channel}:{ts}"` for cache keys and values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageReference {
    pub channel: ChannelId,
    pub ts: MessageTs,
}

impl MessageReference {
    pub fn new(channel: impl Into<ChannelId>, ts: impl Into<MessageTs>) -> Self {
        MessageReference {
            channel: channel.into(),
            ts: ts.into(),
        }
    }
}

impl fmt::Display for MessageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.channel, self.ts)
    }
}

/// Error returned when a rendered message reference cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid message reference: {0:?}")]
pub struct InvalidMessageReference(pub String);

impl FromStr for MessageReference {
    type Err = InvalidMessageReference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((channel, ts)) if !channel.is_empty() && !ts.is_empty() => {
                Ok(MessageReference::new(channel, ts))
            }
            _ => Err(InvalidMessageReference(s.to_string())),
        }
    }
}
