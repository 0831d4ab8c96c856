//! The relay pipeline for a single verified event callback.
//!
//! ```text
//! event ─► DedupGuard ─► classify ─┬─ Post ───► build attachment ─► chat.postMessage ─► record reference
//!                                  ├─ Delete ─► lookup reference ─► chat.delete
//!                                  └─ Ignored / Unsupported ─► report
//! ```
//!
//! Every step runs sequentially within the request. Outbound failures end the
//! request with a [`RelayError`]; nothing is retried.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{DedupGuard, MessageReferenceCache, ProfileResolver};
use crate::slack::{OutboundAttachment, SlackApi, SlackApiError};
use crate::store::{KvStore, StoreError};
use crate::types::{ChannelId, EventId, InboundEvent, MessageReference, SlackEvent, UserId};
use crate::webhooks::{Classification, classify};

pub mod attachment;
pub mod format;
pub mod workspace;

pub use attachment::{ATTACHMENT_COLOR, build_attachment, event_link, message_link};
pub use format::byte_format;
pub use workspace::{FALLBACK_DOMAIN, WorkspaceDomain};

/// Settings the relay needs, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Channel that receives relayed messages.
    pub destination_channel: ChannelId,

    /// The bot's own user ID; its messages are never relayed.
    pub bot_user_id: UserId,

    /// The bot's bot ID (`B...`), when known.
    pub bot_id: Option<String>,

    /// Workspace subdomain override; resolved via `team.info` when `None`.
    pub workspace_domain: Option<String>,
}

impl RelaySettings {
    fn self_ids(&self) -> Vec<&str> {
        let mut ids = vec![self.bot_user_id.as_str()];
        ids.extend(self.bot_id.as_deref());
        ids
    }
}

/// The structured result of relaying one event.
///
/// Serialized externally tagged, e.g. `{"posted": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayOutcome {
    /// The message was relayed; carries the attachment sent.
    Posted(OutboundAttachment),
    /// The event was a message the relay skips.
    Ignored(InboundEvent),
    /// The event was not a message; carries the raw event.
    Unsupported(serde_json::Value),
    /// The event ID was already processed.
    Duplicated(EventId),
    /// The relayed copy was deleted; carries its reference.
    Deleted(MessageReference),
    /// No relayed copy was known; carries the link to the original.
    Undeleted(String),
}

/// Errors that end relay processing for a request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// `chat.postMessage` failed.
    #[error("failed to publish relayed message: {0}")]
    Publish(#[source] SlackApiError),

    /// `chat.delete` failed.
    #[error("failed to delete relayed message {destination}: {source}")]
    Unpublish {
        destination: MessageReference,
        #[source]
        source: SlackApiError,
    },

    /// The shared store failed during deduplication or lookup.
    #[error("relay store error: {0}")]
    Store(#[from] StoreError),
}

/// Orchestrates dedupe, classification, publishing and delete mirroring.
#[derive(Debug)]
pub struct Relay<S, A> {
    settings: RelaySettings,
    slack: Arc<A>,
    dedupe: DedupGuard<S>,
    references: MessageReferenceCache<S>,
    profiles: ProfileResolver<S, A>,
    domain: WorkspaceDomain<S, A>,
}

impl<S, A> Relay<S, A>
where
    S: KvStore + Clone,
    A: SlackApi,
{
    pub fn new(settings: RelaySettings, store: S, slack: Arc<A>) -> Self {
        Relay {
            dedupe: DedupGuard::new(store.clone()),
            references: MessageReferenceCache::new(store.clone()),
            profiles: ProfileResolver::new(store.clone(), slack.clone()),
            domain: WorkspaceDomain::new(settings.workspace_domain.clone(), store, slack.clone()),
            settings,
            slack,
        }
    }

    /// Processes one `event_callback` delivery.
    pub async fn handle_event(
        &self,
        event_id: &EventId,
        event: SlackEvent,
    ) -> Result<RelayOutcome, RelayError> {
        if self.dedupe.is_duplicate(event_id).await? {
            warn!(event_id = %event_id, "Duplicate event delivery");
            return Ok(RelayOutcome::Duplicated(event_id.clone()));
        }

        let classification = classify(event, &self.settings.self_ids());
        debug!(
            event_id = %event_id,
            classification = classification.label(),
            "Classified event"
        );

        match classification {
            Classification::Post(event) => self.post(event).await,
            Classification::Delete(event) => self.delete(event).await,
            Classification::Ignored(event) => {
                info!(event_id = %event_id, subtype = ?event.subtype, "Ignoring message event");
                Ok(RelayOutcome::Ignored(event))
            }
            Classification::Unsupported(raw) => {
                let event_type = raw.get("type").and_then(|t| t.as_str()).unwrap_or_default();
                warn!(event_id = %event_id, event_type, "Unsupported event");
                Ok(RelayOutcome::Unsupported(raw))
            }
        }
    }

    /// Relays `event` to the destination channel and remembers where it went.
    async fn post(&self, event: InboundEvent) -> Result<RelayOutcome, RelayError> {
        let profile = match &event.user {
            Some(user) => self.profiles.resolve(user).await,
            None => None,
        };
        let domain = self.domain.get().await;
        let attachment = build_attachment(&event, profile.as_ref(), domain);

        let published = self
            .slack
            .post_message(&self.settings.destination_channel, &attachment)
            .await
            .map_err(RelayError::Publish)?;

        let origin = event.message_ref();
        info!(origin = %origin, published = %published, "Relayed message");

        // The copy is already visible; losing the reference only means a
        // later delete of the original cannot be mirrored.
        if let Err(e) = self.references.record(&origin, &published).await {
            warn!(origin = %origin, error = %e, "Failed to record message reference");
        }

        Ok(RelayOutcome::Posted(attachment))
    }

    /// Deletes the relayed copy of the message `event` reports as deleted.
    async fn delete(&self, event: InboundEvent) -> Result<RelayOutcome, RelayError> {
        let Some(origin) = event.deleted_ref() else {
            warn!(channel = %event.channel, "message_deleted event without deleted_ts");
            return Ok(RelayOutcome::Ignored(event));
        };

        let Some(destination) = self.references.lookup(&origin).await? else {
            let domain = self.domain.get().await;
            let link = message_link(domain, &origin.channel, &origin.ts, None);
            info!(origin = %origin, "No relayed copy to delete");
            return Ok(RelayOutcome::Undeleted(link));
        };

        self.slack
            .delete_message(&destination)
            .await
            .map_err(|source| RelayError::Unpublish {
                destination: destination.clone(),
                source,
            })?;

        info!(origin = %origin, destination = %destination, "Deleted relayed message");
        Ok(RelayOutcome::Deleted(destination))
    }
}
