//! Date parsing shared by the listing extractor and the detail enricher.
//!
//! Every extraction layer that yields a timestamp-like string funnels
//! through `parse_start_millis`. An unparseable string is `None` — the
//! caller treats it the same as "no time found" and moves on.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Epoch-millis plausibility window: 2005-01-01 .. 2100-01-01 UTC.
/// Anything outside is treated as a non-timestamp number.
const EPOCH_MILLIS_MIN: i64 = 1_104_537_600_000;
const EPOCH_MILLIS_MAX: i64 = 4_102_444_800_000;

/// Parse a date string into `DateTime<Utc>`, trying multiple formats.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // ISO 8601 with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // ISO 8601 without timezone (assume UTC), with or without fraction
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }

    // Date only
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    // US format: "Month Day, Year"
    if let Ok(d) = NaiveDate::parse_from_str(s, "%B %d, %Y") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    None
}

/// Parse a timestamp-like string to epoch milliseconds.
pub fn parse_start_millis(s: &str) -> Option<i64> {
    parse_date(s).map(|dt| dt.timestamp_millis())
}

/// Parse a raw extracted value that may be either a date string or a
/// stringified millisecond epoch (`data-start-time="1717264800000"`).
pub fn parse_start_raw(s: &str) -> Option<i64> {
    let s = s.trim();
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<i64>().ok().filter(|&n| plausible_epoch_millis(n));
    }
    parse_start_millis(s)
}

/// Whether a raw number is shaped like a millisecond epoch timestamp.
pub fn plausible_epoch_millis(n: i64) -> bool {
    (EPOCH_MILLIS_MIN..EPOCH_MILLIS_MAX).contains(&n)
}
