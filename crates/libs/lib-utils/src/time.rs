//! # Time Utilities
//!
//! Timestamps for session bookkeeping using chrono.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format time as RFC3339 string.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339()
}

/// Format a duration for log lines and CLI output, e.g. `1m 05s`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        if secs == 0 {
            return format!("{}ms", duration.as_millis());
        }
        return format!("{}s", secs);
    }
    format!("{}m {:02}s", secs / 60, secs % 60)
}
