//! Timestamp parsing for exported trade logs.
//!
//! Exports from different tools disagree on the separator and on whether
//! seconds are present, so a handful of layouts are accepted. Offsets, when
//! present, are dropped: all analysis works on the wall-clock times the
//! export shows.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const LAYOUTS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

/// Parse a timestamp in any of the accepted layouts.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    for layout in LAYOUTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, layout) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_local());
    }
    if let Ok(ts) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(ts.naive_local());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
