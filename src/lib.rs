//! Slack Relay - relays Slack Events API messages into a destination channel.
//!
//! Incoming deliveries are authenticated (`v0` HMAC signature within a replay
//! window), deduplicated by event ID, classified, and republished as a single
//! attachment. Deleting an original deletes its relayed copy.

pub mod cache;
pub mod config;
pub mod relay;
pub mod server;
pub mod slack;
pub mod store;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub(crate) mod test_utils;
