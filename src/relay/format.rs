//! Human-readable formatting helpers.

/// Binary-prefix units, indexed by `floor(log1024(bytes))`.
const UNITS: [&str; 8] = ["Byte", "KB", "MB", "GB", "TB", "PB", "ZB", "YB"];

/// Formats a byte count with 1024-based units, rounded to a whole number.
///
/// Zero is special-cased: the logarithm it would otherwise need is undefined.
///
/// # Examples
///
/// ```
/// use slack_relay::relay::byte_format;
///
/// assert_eq!(byte_format(0), "0 Byte");
/// assert_eq!(byte_format(1024), "1 KB");
/// assert_eq!(byte_format(1536), "2 KB");
/// ```
pub fn byte_format(bytes: u64) -> String {
    if bytes == 0 {
        return format!("0 {}", UNITS[0]);
    }

    // Integer floor(log1024(bytes)); exact at powers of 1024 where the
    // floating-point ratio of logarithms can land just below the integer.
    let mut index = 0;
    let mut next_threshold: u128 = 1024;
    while index < UNITS.len() - 1 && u128::from(bytes) >= next_threshold {
        index += 1;
        next_threshold *= 1024;
    }

    let value = bytes as f64 / 1024f64.powi(index as i32);
    format!("{} {}", value.round(), UNITS[index])
}
