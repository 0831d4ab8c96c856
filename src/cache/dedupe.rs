//! Duplicate-delivery suppression for Slack event callbacks.
//!
//! Slack retries an event callback when it does not receive a timely 2xx,
//! reusing the same `event_id`. The guard remembers each `event_id` for
//! [`DEDUPE_TTL_SECS`] and reports repeats as duplicates.
//!
//! The lookup and the insert are two separate store operations. Two deliveries
//! arriving at the same instant can both see the id as new and both proceed,
//! so this is at-most-approximately-once, not exactly-once.

use tracing::debug;

use crate::store::{KvStore, StoreError};
use crate::types::EventId;

/// How long a seen `event_id` is remembered.
pub const DEDUPE_TTL_SECS: i64 = 60;

/// Value stored for a seen event. Only existence matters.
const SEEN_SENTINEL: &str = "proceeded";

/// Marks event IDs as seen and detects repeats.
#[derive(Debug, Clone)]
pub struct DedupGuard<S> {
    store: S,
}

impl<S: KvStore> DedupGuard<S> {
    pub fn new(store: S) -> Self {
        DedupGuard { store }
    }

    /// Returns `true` if `event_id` was seen within the TTL window.
    ///
    /// A novel `event_id` is recorded as seen before returning `false`; a
    /// duplicate leaves the store untouched (its TTL is not extended).
    pub async fn is_duplicate(&self, event_id: &EventId) -> Result<bool, StoreError> {
        if self.store.get(event_id.as_str()).await?.is_some() {
            debug!(event_id = %event_id, "Event already processed");
            return Ok(true);
        }

        self.store
            .put(
                event_id.as_str(),
                SEEN_SENTINEL,
                Some(chrono::Duration::seconds(DEDUPE_TTL_SECS)),
            )
            .await?;
        Ok(false)
    }
}
