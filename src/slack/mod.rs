//! Slack Web API access.
//!
//! The relay talks to Slack only through [`SlackApi`], so the core can be
//! exercised against a recording mock. [`SlackClient`] is the reqwest-backed
//! implementation used in production.

use std::future::Future;

use crate::types::{ChannelId, MessageReference, Profile, UserId};

mod client;
mod error;
mod message;

pub use client::{DEFAULT_API_BASE, SlackClient};
pub use error::SlackApiError;
pub use message::{OutboundAttachment, PostMessageRequest};

/// The Slack operations the relay depends on.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct FailingSlack;
///
/// impl SlackApi for FailingSlack {
///     async fn post_message(&self, _: &ChannelId, _: &OutboundAttachment)
///         -> Result<MessageReference, SlackApiError> {
///         Err(SlackApiError::api("chat.postMessage", Some("channel_not_found".into())))
///     }
///     // ...
/// }
/// ```
pub trait SlackApi {
    /// Publishes `attachment` to `channel` (`chat.postMessage`).
    ///
    /// Returns where the message landed.
    fn post_message(
        &self,
        channel: &ChannelId,
        attachment: &OutboundAttachment,
    ) -> impl Future<Output = Result<MessageReference, SlackApiError>> + Send;

    /// Deletes a previously published message (`chat.delete`).
    fn delete_message(
        &self,
        message: &MessageReference,
    ) -> impl Future<Output = Result<(), SlackApiError>> + Send;

    /// Fetches a user's display profile (`users.profile.get`).
    fn get_profile(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Profile, SlackApiError>> + Send;

    /// Fetches the workspace subdomain (`team.info`).
    fn team_domain(&self) -> impl Future<Output = Result<String, SlackApiError>> + Send;
}
