//! Short-lived relay state kept in the shared TTL store.
//!
//! - [`DedupGuard`] suppresses redelivered events (60 second window)
//! - [`MessageReferenceCache`] maps relayed messages back to their originals
//! - [`ProfileResolver`] caches user display profiles
//!
//! All three are best-effort: the store has no transactions, so concurrent
//! requests race on check-then-set and the last write wins.

pub mod dedupe;
pub mod profile;
pub mod references;

pub use dedupe::{DEDUPE_TTL_SECS, DedupGuard};
pub use profile::ProfileResolver;
pub use references::MessageReferenceCache;
