//! Time helpers pinned to KST

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};

/// KST offset in seconds (UTC+9, no DST)
const KST_OFFSET_SECS: i32 = 9 * 3600;

const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Current time in KST
pub fn kst_now() -> DateTime<FixedOffset> {
    let kst = FixedOffset::east_opt(KST_OFFSET_SECS).expect("KST is a valid offset");
    Utc::now().with_timezone(&kst)
}

/// Parse an `HH:MM:SS` clock string
pub fn parse_clock(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, CLOCK_FORMAT).ok()
}

/// Elapsed hours from `sleep_time` to `wake_time`, rounded to 2 decimals.
///
/// A wake time earlier than the sleep time is treated as crossing midnight.
/// Returns 0.0 if either input fails to parse; the original service silently
/// stored a zero here, so the fallback is kept but logged.
pub fn calculate_sleep_duration(sleep_time: &str, wake_time: &str) -> f64 {
    let (Some(sleep), Some(wake)) = (parse_clock(sleep_time), parse_clock(wake_time)) else {
        tracing::warn!(sleep_time, wake_time, "unparseable clock value, recording 0.0 hours");
        return 0.0;
    };

    let mut secs = (wake - sleep).num_seconds();
    if secs < 0 {
        secs += 24 * 3600;
    }

    let hours = secs as f64 / 3600.0;
    (hours * 100.0).round() / 100.0
}
