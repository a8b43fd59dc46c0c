//! Property parsing helpers shared by the feature loaders.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Naive datetime layouts accepted for `TimeCreate`, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parses an ISO-style timestamp string.
///
/// Offset-qualified RFC 3339 values keep their local wall time. A bare
/// date parses as midnight.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a `TimeCreate` JSON value: either a timestamp string or epoch
/// milliseconds (as written by some `GeoJSON` exporters).
#[must_use]
pub fn timestamp_from_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

/// Reads a categorical text value. Numbers are accepted and rendered with
/// their JSON representation, since tract ids are often exported as
/// numerics.
#[must_use]
pub fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
