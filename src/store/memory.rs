//! In-process implementation of [`KvStore`].
//!
//! Entries carry an absolute expiry; expired entries are invisible to `get`
//! and are pruned on every write so the map cannot grow without bound. A
//! poisoned lock makes the store report [`StoreError::Unavailable`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::{Clock, KvStore, StoreError, SystemClock};

/// Default expiry applied when a caller passes `ttl: None` (6 hours).
pub const DEFAULT_TTL_SECS: i64 = 6 * 60 * 60;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// A TTL map shared by clones of the same store.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

struct MemoryStoreInner {
    entries: Mutex<HashMap<String, Entry>>,
    default_ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Creates a store using the wall clock and the given default TTL.
    pub fn new(default_ttl: chrono::Duration) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Creates a store reading time from `clock`.
    pub fn with_clock(default_ttl: chrono::Duration, clock: Arc<dyn Clock>) -> Self {
        MemoryStore {
            inner: Arc::new(MemoryStoreInner {
                entries: Mutex::new(HashMap::new()),
                default_ttl,
                clock,
            }),
        }
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, StoreError> {
        self.inner
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    /// Poisons the entry lock, as a panic mid-write would.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let inner = Arc::clone(&self.inner);
        let _ = std::thread::spawn(move || {
            let _guard = inner.entries.lock();
            panic!("poisoning memory store");
        })
        .join();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(chrono::Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("default_ttl", &self.inner.default_ttl)
            .finish_non_exhaustive()
    }
}

impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = self.inner.clock.now();
        let entries = self.entries()?;
        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone()))
    }

    async fn put(
        &self,
        key: &str,
        value: &str,
        ttl: Option<chrono::Duration>,
    ) -> Result<(), StoreError> {
        let now = self.inner.clock.now();
        // A TTL past the end of representable time never expires.
        let expires_at = now
            .checked_add_signed(ttl.unwrap_or(self.inner.default_ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut entries = self.entries()?;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}
