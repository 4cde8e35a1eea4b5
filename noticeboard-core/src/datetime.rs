//! Parsing of the free-form `datetime` strings events carry.
//!
//! Offset-qualified values (RFC 3339) are converted to UTC. Everything else is
//! taken at face value as a floating wall-clock time.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Accepted layouts for datetimes without an offset, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an event datetime. Returns None for anything unrecognized.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Milliseconds since the epoch, or None if it doesn't parse.
///
/// None orders before every Some, so unparseable values sort ahead of any
/// real date, including ones before 1970.
pub fn timestamp_millis(s: &str) -> Option<i64> {
    parse_datetime(s).map(|dt| dt.and_utc().timestamp_millis())
}

/// `YYYY-MM` bucket for a datetime, or None if it doesn't parse.
pub fn month_key(s: &str) -> Option<String> {
    parse_datetime(s).map(|dt| dt.format("%Y-%m").to_string())
}
