//! Human-readable duration formatting

use std::time::Duration;

const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

/// Format a duration as `1h 2m 5s`, dropping leading zero units.
///
/// Sub-second durations are shown in milliseconds.
///
/// ```
/// use std::time::Duration;
///
/// use storefront_common::time::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
/// assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let mut remaining = duration.as_secs();
    if remaining == 0 {
        return format!("{}ms", duration.as_millis());
    }

    let mut parts = Vec::new();
    for (size, suffix) in UNITS {
        let value = remaining / size;
        remaining %= size;
        if value > 0 || !parts.is_empty() {
            parts.push(format!("{value}{suffix}"));
        }
    }
    parts.join(" ")
}

/// Format a remaining lifetime in seconds, `expired` when zero.
pub fn format_remaining(seconds: u64) -> String {
    if seconds == 0 {
        "expired".to_string()
    } else {
        format_duration(Duration::from_secs(seconds))
    }
}
