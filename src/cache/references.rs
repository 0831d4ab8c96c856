//! Origin → relayed message mapping for delete propagation.
//!
//! When a message is relayed, its source `(channel, ts)` is stored against the
//! `(channel, ts)` Slack assigned to the copy. A later `message_deleted` for the
//! source looks the copy up and deletes it. Entries use the store's default
//! TTL; a delete arriving after expiry simply finds nothing.

use tracing::warn;

use crate::store::{KvStore, StoreError};
use crate::types::MessageReference;

/// Records and resolves relayed-message references.
#[derive(Debug, Clone)]
pub struct MessageReferenceCache<S> {
    store: S,
}

impl<S: KvStore> MessageReferenceCache<S> {
    pub fn new(store: S) -> Self {
        MessageReferenceCache { store }
    }

    /// Stores `origin → destination`, keyed `"{channel}:{ts}"`.
    pub async fn record(
        &self,
        origin: &MessageReference,
        destination: &MessageReference,
    ) -> Result<(), StoreError> {
        self.store
            .put(&origin.to_string(), &destination.to_string(), None)
            .await
    }

    /// Returns the relayed copy of `origin`, if one is still remembered.
    ///
    /// A stored value that fails to parse is treated as absent.
    pub async fn lookup(
        &self,
        origin: &MessageReference,
    ) -> Result<Option<MessageReference>, StoreError> {
        let Some(raw) = self.store.get(&origin.to_string()).await? else {
            return Ok(None);
        };

        match raw.parse::<MessageReference>() {
            Ok(destination) => Ok(Some(destination)),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Discarding unparseable message reference");
                Ok(None)
            }
        }
    }
}
