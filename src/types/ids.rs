//! Newtype wrappers for Slack identifiers.
//!
//! These types prevent accidental mixing of different ID types (e.g., passing a
//! user ID where a channel ID is expected) and make signatures self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Slack channel ID (e.g. `C2147483705`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(s: impl Into<String>) -> Self {
        ChannelId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        ChannelId(s.to_string())
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        ChannelId(s)
    }
}

/// A Slack user or bot user ID (e.g. `U2147483697`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(s: impl Into<String>) -> Self {
        UserId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the mrkdwn mention for this user (`<@U123>`).
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// A Slack Events API event ID (the envelope's `event_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn new(s: impl Into<String>) -> Self {
        EventId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Slack message timestamp (e.g. `1355517523.000005`).
///
/// Unique per channel, so it doubles as the message ID. Treated as an opaque
/// string; the only numeric interpretation is [`MessageTs::as_seconds`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTs(pub String);

impl MessageTs {
    pub fn new(s: impl Into<String>) -> Self {
        MessageTs(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the timestamp as fractional unix seconds.
    ///
    /// Returns `None` for non-numeric timestamps.
    pub fn as_seconds(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|secs| secs.is_finite())
    }
}

impl fmt::Display for MessageTs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageTs {
    fn from(s: &str) -> Self {
        MessageTs(s.to_string())
    }
}

impl From<String> for MessageTs {
    fn from(s: String) -> Self {
        MessageTs(s)
    }
}
