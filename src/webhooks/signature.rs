//! Slack request signature verification using HMAC-SHA256.
//!
//! Slack signs every request with the app's signing secret. The signature is
//! provided in the `X-Slack-Signature` header as `v0=<hex>` and covers the
//! string `"{version}:{timestamp}:{body}"`, where the timestamp comes from the
//! `X-Slack-Request-Timestamp` header.
//!
//! Requests older than [`REPLAY_WINDOW_SECS`] are rejected before any HMAC
//! work, so replayed captures are cheap to turn away. Invalid requests should
//! be rejected before the body is parsed.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a request, in seconds.
pub const REPLAY_WINDOW_SECS: i64 = 60;

/// Signature scheme version Slack currently uses.
pub const SIGNATURE_VERSION: &str = "v0";

/// Splits a signature header (e.g. `"v0=abc123..."`) into its version and raw bytes.
///
/// Returns `None` for malformed headers (missing `=`, empty version, invalid hex).
/// Never panics.
///
/// # Examples
///
/// ```
/// use slack_relay::webhooks::parse_signature_header;
///
/// let (version, sig) = parse_signature_header("v0=abcd1234").unwrap();
/// assert_eq!(version, "v0");
/// assert_eq!(sig, vec![0xab, 0xcd, 0x12, 0x34]);
///
/// // Invalid: missing separator
/// assert!(parse_signature_header("abcd1234").is_none());
///
/// // Invalid: bad hex
/// assert!(parse_signature_header("v0=xyz").is_none());
/// ```
pub fn parse_signature_header(header: &str) -> Option<(&str, Vec<u8>)> {
    let (version, hex_sig) = header.split_once('=')?;
    if version.is_empty() {
        return None;
    }
    // hex::decode accepts either case
    let signature = hex::decode(hex_sig).ok()?;
    Some((version, signature))
}

/// Builds the string Slack signs: `"{version}:{timestamp}:{body}"`.
fn base_string(version: &str, timestamp: &str, body: &[u8]) -> Vec<u8> {
    let mut base = Vec::with_capacity(version.len() + timestamp.len() + body.len() + 2);
    base.extend_from_slice(version.as_bytes());
    base.push(b':');
    base.extend_from_slice(timestamp.as_bytes());
    base.push(b':');
    base.extend_from_slice(body);
    base
}

/// Computes the HMAC-SHA256 signature of a request.
///
/// This is useful for testing purposes (generating expected signatures).
pub fn compute_signature(version: &str, timestamp: &str, body: &[u8], secret: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, so this never takes the Err branch.
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return Vec::new();
    };
    mac.update(&base_string(version, timestamp, body));
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature as a Slack-style header value (`"v0=<hex>"`).
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("{}={}", SIGNATURE_VERSION, hex::encode(signature))
}

/// Returns `true` if `timestamp_header` is within the replay window of `now`.
///
/// Non-integer timestamps are never fresh.
pub fn is_fresh(timestamp_header: &str, now: DateTime<Utc>) -> bool {
    match timestamp_header.trim().parse::<i64>() {
        Ok(timestamp) => now.timestamp().saturating_sub(timestamp) < REPLAY_WINDOW_SECS,
        Err(_) => false,
    }
}

/// Verifies a Slack request signature.
///
/// Returns `true` only if the request is fresh and the signature matches.
/// The digest comparison is constant-time and covers the full 32 bytes.
///
/// # Arguments
///
/// * `signature_header` - The `X-Slack-Signature` header (e.g. `"v0=..."`)
/// * `timestamp_header` - The `X-Slack-Request-Timestamp` header (unix seconds)
/// * `body` - The raw request body bytes
/// * `secret` - The app's signing secret
/// * `now` - The current time
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use slack_relay::webhooks::{compute_signature, format_signature_header, verify_signature};
///
/// let body = b"token=xyzz0WbapA4vBCDEFasx0q6G";
/// let secret = b"8f742231b10e8888abcd99yyyzzz85a5";
/// let now = Utc.timestamp_opt(1531420618, 0).unwrap();
///
/// let sig = compute_signature("v0", "1531420618", body, secret);
/// let header = format_signature_header(&sig);
///
/// assert!(verify_signature(&header, "1531420618", body, secret, now));
/// assert!(!verify_signature(&header, "1531420618", body, b"wrong-secret", now));
/// ```
pub fn verify_signature(
    signature_header: &str,
    timestamp_header: &str,
    body: &[u8],
    secret: &[u8],
    now: DateTime<Utc>,
) -> bool {
    // Stale requests are rejected before touching the HMAC.
    if !is_fresh(timestamp_header, now) {
        return false;
    }

    let Some((version, expected_signature)) = parse_signature_header(signature_header) else {
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(&base_string(version, timestamp_header, body));

    // Constant-time, full-length comparison via the HMAC library
    mac.verify_slice(&expected_signature).is_ok()
}
