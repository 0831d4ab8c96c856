//! Webhook handling for Slack Events API requests.
//!
//! This module provides:
//! - Signature verification with replay-window enforcement (HMAC-SHA256)
//! - Envelope parsing (`url_verification`, `event_callback`)
//! - Event classification deciding what the relay does with each event

pub mod classify;
pub mod envelope;
pub mod signature;

pub use classify::{Classification, classify};
pub use envelope::{Envelope, EnvelopeError, EnvelopeKind, parse_envelope};
pub use signature::{
    REPLAY_WINDOW_SECS, compute_signature, format_signature_header, is_fresh,
    parse_signature_header, verify_signature,
};
