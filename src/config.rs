//! Process configuration read from the environment.
//!
//! Required:
//!
//! - `SLACK_SIGNING_SECRET` - app signing secret for request signatures
//! - `SLACK_VERIFICATION_TOKEN` - legacy token echoed in every envelope
//! - `SLACK_BOT_TOKEN` - bot token (`xoxb-...`) for Web API calls
//! - `RELAY_DESTINATION_CHANNEL` - channel ID receiving relayed messages
//!
//! Optional:
//!
//! - `SLACK_BOT_USER_ID` - the bot's user ID; discovered via `auth.test` if unset
//! - `SLACK_BOT_ID` - the bot's `B...` ID, also treated as self
//! - `SLACK_WORKSPACE_DOMAIN` - workspace subdomain; resolved via `team.info` if unset
//! - `SLACK_API_BASE` (default `https://slack.com/api`)
//! - `RELAY_BIND_ADDR` (default `0.0.0.0:3000`)
//! - `RELAY_CACHE_TTL_SECS` (default 21600)
//! - `RELAY_HTTP_TIMEOUT_SECS` (default 10)

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::relay::RelaySettings;
use crate::slack::DEFAULT_API_BASE;
use crate::store::memory::DEFAULT_TTL_SECS;
use crate::types::{ChannelId, UserId};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Configuration for one relay process.
#[derive(Debug, Clone)]
pub struct Config {
    pub signing_secret: String,
    pub verification_token: String,
    pub bot_token: String,
    pub destination_channel: ChannelId,
    pub bot_user_id: Option<UserId>,
    pub bot_id: Option<String>,
    pub workspace_domain: Option<String>,
    pub api_base: String,
    pub bind_addr: SocketAddr,
    pub cache_ttl: chrono::Duration,
    pub http_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let bind_addr = optional("RELAY_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "RELAY_BIND_ADDR",
                reason: e.to_string(),
            })?;

        let cache_ttl_secs = parse_secs(
            "RELAY_CACHE_TTL_SECS",
            optional("RELAY_CACHE_TTL_SECS"),
            DEFAULT_TTL_SECS as u64,
        )?;
        let http_timeout_secs = parse_secs(
            "RELAY_HTTP_TIMEOUT_SECS",
            optional("RELAY_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let cache_ttl = i64::try_from(cache_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or(ConfigError::Invalid {
                name: "RELAY_CACHE_TTL_SECS",
                reason: "out of range".to_string(),
            })?;

        Ok(Config {
            signing_secret: required("SLACK_SIGNING_SECRET")?,
            verification_token: required("SLACK_VERIFICATION_TOKEN")?,
            bot_token: required("SLACK_BOT_TOKEN")?,
            destination_channel: ChannelId::new(required("RELAY_DESTINATION_CHANNEL")?),
            bot_user_id: optional("SLACK_BOT_USER_ID").map(UserId::new),
            bot_id: optional("SLACK_BOT_ID"),
            workspace_domain: optional("SLACK_WORKSPACE_DOMAIN"),
            api_base: optional("SLACK_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            bind_addr,
            cache_ttl,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// Builds the relay settings once the bot's own user ID is known.
    pub fn relay_settings(&self, bot_user_id: UserId) -> RelaySettings {
        RelaySettings {
            destination_channel: self.destination_channel.clone(),
            bot_user_id,
            bot_id: self.bot_id.clone(),
            workspace_domain: self.workspace_domain.clone(),
        }
    }
}

fn parse_secs(name: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}
