//! Outbound message payloads.

use serde::{Deserialize, Serialize};

use crate::types::ChannelId;

/// A legacy secondary attachment, the only rich formatting the relay emits.
///
/// Built fresh for every relayed message and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundAttachment {
    pub text: String,

    pub color: String,

    pub footer: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Unix seconds of the source message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<f64>,
}

/// Body of a `chat.postMessage` call.
#[derive(Debug, Clone, Serialize)]
pub struct PostMessageRequest<'a> {
    pub channel: &'a ChannelId,
    pub attachments: [&'a OutboundAttachment; 1],
    pub link_names: bool,
    pub mrkdwn: bool,
    pub unfurl_links: bool,
}

impl<'a> PostMessageRequest<'a> {
    pub fn new(channel: &'a ChannelId, attachment: &'a OutboundAttachment) -> Self {
        PostMessageRequest {
            channel,
            attachments: [attachment],
            link_names: true,
            mrkdwn: true,
            unfurl_links: true,
        }
    }
}
