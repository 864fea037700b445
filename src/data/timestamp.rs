use chrono::{DateTime, Local, TimeZone};

use crate::source::Reading;

/// Timestamps at or above this value are epoch milliseconds, below it epoch
/// seconds. 10^11 seconds is far in the future; 10^11 milliseconds is 1973.
const MILLIS_THRESHOLD: f64 = 1e11;

/// Convert an epoch timestamp in seconds or milliseconds to local time.
pub fn to_local(timestamp: f64) -> Option<DateTime<Local>> {
    if !timestamp.is_finite() || timestamp < 0.0 {
        return None;
    }

    let millis = if timestamp >= MILLIS_THRESHOLD {
        timestamp
    } else {
        timestamp * 1000.0
    };

    Local.timestamp_millis_opt(millis as i64).single()
}

/// When a reading was taken. Readings without a usable timestamp are
/// considered taken now.
pub fn observed_at(reading: &Reading) -> DateTime<Local> {
    reading.timestamp.and_then(to_local).unwrap_or_else(Local::now)
}

/// Format a time as a wall-clock label for charts and the header.
pub fn format_time(time: &DateTime<Local>) -> String {
    time.format("%H:%M:%S").to_string()
}
