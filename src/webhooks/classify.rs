//! Event classification for inbound Slack events.
//!
//! Decides from `(type, subtype, actor)` whether an event is relayed, mirrored
//! as a deletion, or dropped.
//!
//! | type      | subtype                                   | actor is self | outcome       |
//! |-----------|-------------------------------------------|---------------|---------------|
//! | ≠ message | *                                         | *             | `Unsupported` |
//! | message   | none / `file_share` / `thread_broadcast`  | yes           | `Ignored`     |
//! | message   | none / `file_share` / `thread_broadcast`  | no            | `Post`        |
//! | message   | `message_deleted`                         | yes           | `Ignored`     |
//! | message   | `message_deleted`                         | no            | `Delete`      |
//! | message   | anything else (`message_changed`, ...)    | *             | `Ignored`     |
//!
//! Self-authored events are ignored so the relay never echoes its own posts.

use serde_json::Value;

use crate::types::{InboundEvent, MessageSubtype, SlackEvent};

/// What the relay should do with an event. Each variant carries the event.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Relay the message to the destination channel.
    Post(InboundEvent),
    /// Delete the relayed copy of a removed message.
    Delete(InboundEvent),
    /// A message event the relay deliberately skips.
    Ignored(InboundEvent),
    /// Not a message event at all; carries the raw event.
    Unsupported(Value),
}

impl Classification {
    /// A short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Post(_) => "post",
            Classification::Delete(_) => "delete",
            Classification::Ignored(_) => "ignored",
            Classification::Unsupported(_) => "unsupported",
        }
    }
}

/// Classifies `event`, treating `self_ids` as the relay's own identities.
///
/// `self_ids` usually holds the bot user ID and, when known, the bot ID.
pub fn classify(event: SlackEvent, self_ids: &[&str]) -> Classification {
    let event = match event {
        SlackEvent::Message(event) if event.is_message() => event,
        SlackEvent::Message(event) => {
            return Classification::Unsupported(serde_json::to_value(&event).unwrap_or(Value::Null));
        }
        SlackEvent::Other(raw) => return Classification::Unsupported(raw),
    };

    let is_self = event
        .actor_id()
        .is_some_and(|actor| self_ids.contains(&actor));

    match event.message_subtype() {
        MessageSubtype::None | MessageSubtype::FileShare | MessageSubtype::ThreadBroadcast => {
            if is_self {
                Classification::Ignored(event)
            } else {
                Classification::Post(event)
            }
        }
        MessageSubtype::MessageDeleted => {
            if is_self {
                Classification::Ignored(event)
            } else {
                Classification::Delete(event)
            }
        }
        MessageSubtype::Other(_) => Classification::Ignored(event),
    }
}
