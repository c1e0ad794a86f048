//! Coercive field parsing shared by both CSV readers.
//!
//! Both source exports contain cells that fail to parse (empty strings,
//! sentinel dashes, free text in numeric columns). Those become `None`
//! rather than aborting the load.

use chrono::{NaiveDateTime, Timelike};

/// Timestamp layouts observed across the two exports.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parses a timestamp cell, trying each known layout in order.
pub fn timestamp_opt(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Parses a numeric cell, coercing anything unparseable to `None`.
pub fn f64_opt(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

/// Truncates a timestamp to the start of its containing hour.
pub fn floor_to_hour(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}
