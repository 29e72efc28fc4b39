// Permissive timestamp parsing for the first record of a bucket
//
// Producers disagree on timestamp formats, so this accepts the common ones.
// An explicit offset is kept as written so keys use the producer's wall-clock
// time. Naive date-times and epoch values are taken as UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Epoch values at or above this magnitude are milliseconds, below are seconds
const MILLIS_THRESHOLD: f64 = 1e11;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%d/%b/%Y:%H:%M:%S %z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a JSON timestamp value (string or epoch number).
pub fn parse_timestamp(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n.as_f64().and_then(from_epoch),
        _ => None,
    }
}

pub fn parse_timestamp_str(input: &str) -> Option<DateTime<FixedOffset>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt);
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    // "Z" suffix outside of strict RFC 3339 (e.g. "2024-01-02 03:04:05Z")
    let naive_input = s.strip_suffix('Z').unwrap_or(s);
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_input, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().fixed_offset());
    }

    s.parse::<f64>().ok().and_then(from_epoch)
}

fn from_epoch(value: f64) -> Option<DateTime<FixedOffset>> {
    if !value.is_finite() {
        return None;
    }
    let utc: Option<DateTime<Utc>> = if value.abs() >= MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(value.floor() as i64)
    } else {
        // floor keeps the fractional part non-negative for pre-epoch values
        let secs = value.floor();
        let nanos = ((value - secs) * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
        DateTime::from_timestamp(secs as i64, nanos)
    };
    utc.map(|dt| dt.fixed_offset())
}
