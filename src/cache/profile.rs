//! Cached user profile lookup.
//!
//! Profiles decorate the author block of a relayed message. Resolution never
//! fails the relay: any error yields `None` and the caller falls back to a raw
//! user mention. Failures are not cached, so the next event retries the fetch.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::slack::SlackApi;
use crate::store::{KvStore, StoreError, get_json, put_json};
use crate::types::{Profile, UserId};

/// Resolves user IDs to display profiles, cache first.
#[derive(Debug)]
pub struct ProfileResolver<S, A> {
    store: S,
    slack: Arc<A>,
}

impl<S: KvStore, A: SlackApi> ProfileResolver<S, A> {
    pub fn new(store: S, slack: Arc<A>) -> Self {
        ProfileResolver { store, slack }
    }

    fn cache_key(user: &UserId) -> String {
        format!("profile:{}", user)
    }

    /// Returns the profile for `user`, or `None` if it cannot be resolved.
    pub async fn resolve(&self, user: &UserId) -> Option<Profile> {
        let key = Self::cache_key(user);

        match get_json::<_, Profile>(&self.store, &key).await {
            Ok(Some(profile)) => {
                debug!(user = %user, "Profile cache hit");
                return Some(profile);
            }
            Ok(None) => {}
            Err(StoreError::Serialization(e)) => {
                warn!(user = %user, error = %e, "Ignoring corrupt cached profile");
            }
            Err(e) => warn!(user = %user, error = %e, "Profile cache unavailable"),
        }

        let profile = match self.slack.get_profile(user).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(user = %user, error = %e, "Failed to resolve profile");
                return None;
            }
        };

        if let Err(e) = put_json(&self.store, &key, &profile, None).await {
            warn!(user = %user, error = %e, "Failed to cache profile");
        }

        Some(profile)
    }
}
