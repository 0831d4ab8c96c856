//! Core domain types for the relay.
//!
//! Identifiers are newtypes so channel IDs, user IDs and message timestamps
//! cannot be mixed up at call sites.

pub mod event;
pub mod ids;

pub use event::{
    InboundEvent, InvalidMessageReference, MessageReference, MessageSubtype, PreviousMessage,
    Profile, SlackEvent, SlackFile,
};
pub use ids::{ChannelId, EventId, MessageTs, UserId};
