//! TTL key-value store capability.
//!
//! Every piece of relay state (dedupe markers, message references, cached
//! profiles, the workspace domain) lives behind [`KvStore`]. The store offers
//! no cross-key transactions: callers do check-then-set and accept that two
//! concurrent requests may both observe a missing key. Last write wins.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStore;

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be (de)serialized.
    #[error("store value serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A shared, TTL-expiring key-value service.
///
/// `ttl: None` means "use the backend's default expiry".
pub trait KvStore {
    /// Returns the value for `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Stores `value` under `key`, replacing any existing entry.
    fn put(
        &self,
        key: &str,
        value: &str,
        ttl: Option<chrono::Duration>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Reads `key` and deserializes it from JSON.
///
/// A value that does not parse as `T` is a [`StoreError::Serialization`].
pub async fn get_json<S, T>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    S: KvStore,
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serializes `value` to JSON and stores it under `key`.
pub async fn put_json<S, T>(
    store: &S,
    key: &str,
    value: &T,
    ttl: Option<chrono::Duration>,
) -> Result<(), StoreError>
where
    S: KvStore,
    T: Serialize,
{
    let raw = serde_json::to_string(value)?;
    store.put(key, &raw, ttl).await
}

/// A source of the current time.
///
/// Injected so expiry can be tested without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
