//! Lazily resolved workspace domain.
//!
//! Message and profile links need the source workspace's subdomain
//! (`https://{domain}.slack.com/...`). The domain is resolved on first use:
//! configured override, then the shared store, then `team.info`. A successful
//! lookup is written back to the store. If everything fails the placeholder
//! [`FALLBACK_DOMAIN`] is used for that call only; Slack redirects
//! `my.slack.com` to the signed-in workspace.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::slack::{SlackApi, SlackApiError};
use crate::store::KvStore;

/// Domain used when the real one cannot be determined.
pub const FALLBACK_DOMAIN: &str = "my";

/// Store key holding the resolved domain.
pub const DOMAIN_STORE_KEY: &str = "workspace_domain";

/// Memoized resolver for the workspace domain.
#[derive(Debug)]
pub struct WorkspaceDomain<S, A> {
    configured: Option<String>,
    resolved: OnceCell<String>,
    store: S,
    slack: Arc<A>,
}

impl<S: KvStore, A: SlackApi> WorkspaceDomain<S, A> {
    pub fn new(configured: Option<String>, store: S, slack: Arc<A>) -> Self {
        WorkspaceDomain {
            configured: configured.filter(|d| !d.trim().is_empty()),
            resolved: OnceCell::new(),
            store,
            slack,
        }
    }

    /// Returns the workspace domain, resolving it on first success.
    ///
    /// A resolved domain is memoized. The fallback is not, so the next call
    /// retries `team.info`.
    pub async fn get(&self) -> &str {
        match self.resolved.get_or_try_init(|| self.resolve()).await {
            Ok(domain) => domain.as_str(),
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = FALLBACK_DOMAIN,
                    "Failed to resolve workspace domain"
                );
                FALLBACK_DOMAIN
            }
        }
    }

    async fn resolve(&self) -> Result<String, SlackApiError> {
        if let Some(domain) = &self.configured {
            return Ok(domain.clone());
        }

        match self.store.get(DOMAIN_STORE_KEY).await {
            Ok(Some(domain)) if !domain.is_empty() => return Ok(domain),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Workspace domain store lookup failed"),
        }

        let domain = self.slack.team_domain().await?;
        info!(domain = %domain, "Resolved workspace domain");
        if let Err(e) = self.store.put(DOMAIN_STORE_KEY, &domain, None).await {
            warn!(error = %e, "Failed to store workspace domain");
        }
        Ok(domain)
    }
}
