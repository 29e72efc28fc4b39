//! Classification of log entries into per-type buckets
//!
//! Missing metadata never drops an entry. It is filed under a degraded type
//! name instead:
//!
//! - no type field: `<unknown>/unknown_type`
//! - no timestamp field: `<unknown>/<type>_no_timestamp` (the prefix is only
//!   added when the type does not already carry it)

use chrono::{DateTime, Utc};

use crate::bucket::{BucketMap, FirstSeen};
use crate::entry::LogEntry;
use crate::timestamp::parse_timestamp;

pub const UNKNOWN_TYPE_SUFFIX: &str = "unknown_type";
pub const NO_TIMESTAMP_SUFFIX: &str = "_no_timestamp";

/// Names of the fields the classifier reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub type_field: String,
    pub timestamp_field: String,
    pub id_field: String,
    /// Prefix marking degraded types, e.g. `unknown`
    pub unknown_prefix: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            type_field: "log_type".to_string(),
            timestamp_field: "timestamp".to_string(),
            id_field: "id".to_string(),
            unknown_prefix: "unknown".to_string(),
        }
    }
}

impl FieldNames {
    pub fn unknown_type(&self) -> String {
        format!("{}/{}", self.unknown_prefix, UNKNOWN_TYPE_SUFFIX)
    }

    pub fn no_timestamp_type(&self, log_type: &str) -> String {
        if log_type.starts_with(&self.unknown_prefix) {
            format!("{}{}", log_type, NO_TIMESTAMP_SUFFIX)
        } else {
            format!("{}/{}{}", self.unknown_prefix, log_type, NO_TIMESTAMP_SUFFIX)
        }
    }
}

/// Degradation counters for one batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyStats {
    pub processed: usize,
    pub missing_type: usize,
    pub missing_timestamp: usize,
    pub unparsable_timestamp: usize,
    pub generated_id: usize,
}

pub struct Classifier {
    fields: FieldNames,
    now: fn() -> DateTime<Utc>,
    stats: ClassifyStats,
}

impl Classifier {
    pub fn new(fields: FieldNames) -> Self {
        Self::with_clock(fields, Utc::now)
    }

    /// Classifier with an injected wall clock
    pub fn with_clock(fields: FieldNames, now: fn() -> DateTime<Utc>) -> Self {
        Self {
            fields,
            now,
            stats: ClassifyStats::default(),
        }
    }

    pub fn fields(&self) -> &FieldNames {
        &self.fields
    }

    pub fn stats(&self) -> ClassifyStats {
        self.stats
    }

    /// File one entry into `buckets`, returning the type it was filed under.
    pub fn classify(&mut self, entry: LogEntry, buckets: &mut BucketMap) -> String {
        self.stats.processed += 1;

        let id = entry.label(&self.fields.id_field);

        let log_type = match entry.label(&self.fields.type_field) {
            Some(log_type) => log_type,
            None => {
                let fallback = self.fields.unknown_type();
                tracing::warn!(
                    field = %self.fields.type_field,
                    log_type = %fallback,
                    "Cannot retrieve type field, marking as unknown"
                );
                self.stats.missing_type += 1;
                fallback
            }
        };

        let Some(raw_timestamp) = entry.get(&self.fields.timestamp_field).cloned() else {
            let log_type = self.fields.no_timestamp_type(&log_type);
            tracing::warn!(
                field = %self.fields.timestamp_field,
                log_type = %log_type,
                "Cannot retrieve timestamp field, re-marking"
            );
            self.stats.missing_timestamp += 1;

            let now = self.now;
            let stats = &mut self.stats;
            buckets.append(&log_type, entry, || FirstSeen {
                timestamp: now().fixed_offset(),
                id: id_or_random(id, &log_type, stats),
            });
            return log_type;
        };

        let now = self.now;
        let stats = &mut self.stats;
        buckets.append(&log_type, entry, || {
            let timestamp = parse_timestamp(&raw_timestamp).unwrap_or_else(|| {
                tracing::warn!(
                    log_type = %log_type,
                    timestamp = %raw_timestamp,
                    "Bad timestamp, falling back to current time"
                );
                stats.unparsable_timestamp += 1;
                now().fixed_offset()
            });
            FirstSeen {
                timestamp,
                id: id_or_random(id, &log_type, stats),
            }
        });
        log_type
    }
}

fn id_or_random(id: Option<String>, log_type: &str, stats: &mut ClassifyStats) -> String {
    match id {
        Some(id) => {
            tracing::debug!(log_type, id = %id, "Using first log record ID as filename suffix");
            id
        }
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            tracing::info!(
                log_type,
                id = %id,
                "First log record ID is not available, using random ID as filename suffix"
            );
            stats.generated_id += 1;
            id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 7, 8, 9, 10).unwrap()
    }

    fn classifier() -> Classifier {
        Classifier::with_clock(FieldNames::default(), fixed_now)
    }

    fn entry(value: Value) -> LogEntry {
        LogEntry::from_value(value).unwrap()
    }

    #[test]
    fn test_first_entry_sets_metadata() {
        let mut c = classifier();
        let mut map = BucketMap::new();

        c.classify(
            entry(json!({"log_type": "app", "id": "abc", "timestamp": "2024-01-02T03:04:05Z"})),
            &mut map,
        );
        c.classify(
            entry(json!({"log_type": "app", "id": "zzz", "timestamp": "2020-01-01T00:00:00Z"})),
            &mut map,
        );

        let bucket = map.get("app").unwrap();
        let first = bucket.first_seen().unwrap();
        assert_eq!(first.id, "abc");
        assert_eq!(first.timestamp, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(bucket.len(), 2);
    }

    #[test]
    fn test_first_timestamp_keeps_its_offset() {
        let mut c = classifier();
        let mut map = BucketMap::new();

        c.classify(
            entry(json!({"log_type": "app", "id": "abc", "timestamp": "2024-01-02T03:04:05+09:00"})),
            &mut map,
        );

        let first = map.get("app").unwrap().first_seen().unwrap().clone();
        assert_eq!(first.timestamp.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(
            crate::key::object_key("logs", "app", &first),
            "logs/app/2024-01/02/2024-01-02-03:04:05-abc.gz"
        );
    }

    #[test]
    fn test_later_entries_never_fill_in_metadata() {
        let mut c = classifier();
        let mut map = BucketMap::new();

        c.classify(entry(json!({"log_type": "app", "timestamp": "garbage"})), &mut map);
        c.classify(
            entry(json!({"log_type": "app", "id": "late", "timestamp": "2024-01-02T03:04:05Z"})),
            &mut map,
        );

        let first = map.get("app").unwrap().first_seen().unwrap().clone();
        assert_eq!(first.timestamp, fixed_now());
        assert_ne!(first.id, "late");
        assert_eq!(first.id.len(), 36);

        let stats = c.stats();
        assert_eq!(stats.unparsable_timestamp, 1);
        assert_eq!(stats.generated_id, 1);
        assert_eq!(stats.processed, 2);
    }

    #[test]
    fn test_missing_type() {
        let mut c = classifier();
        let mut map = BucketMap::new();

        let filed = c.classify(
            entry(json!({"id": "1", "timestamp": "2024-01-02T03:04:05Z"})),
            &mut map,
        );
        assert_eq!(filed, "unknown/unknown_type");
        assert_eq!(c.stats().missing_type, 1);
    }

    #[test]
    fn test_missing_timestamp() {
        let mut c = classifier();
        let mut map = BucketMap::new();

        let filed = c.classify(entry(json!({"log_type": "app", "id": "x"})), &mut map);
        assert_eq!(filed, "unknown/app_no_timestamp");

        let filed = c.classify(entry(json!({"id": "y"})), &mut map);
        assert_eq!(filed, "unknown/unknown_type_no_timestamp");

        let bucket = map.get("unknown/app_no_timestamp").unwrap();
        let first = bucket.first_seen().unwrap();
        assert_eq!(first.id, "x");
        assert_eq!(first.timestamp, fixed_now());
        assert_eq!(c.stats().missing_timestamp, 2);
    }

    #[test]
    fn test_no_timestamp_entry_does_not_touch_timed_bucket() {
        let mut c = classifier();
        let mut map = BucketMap::new();

        c.classify(
            entry(json!({"log_type": "app", "id": "a", "timestamp": "2024-01-02T03:04:05Z"})),
            &mut map,
        );
        c.classify(entry(json!({"log_type": "app", "id": "b"})), &mut map);

        assert_eq!(map.get("app").unwrap().len(), 1);
        assert_eq!(map.get("unknown/app_no_timestamp").unwrap().len(), 1);
        assert_eq!(map.get("app").unwrap().first_seen().unwrap().id, "a");
    }

    #[test]
    fn test_null_timestamp_counts_as_present() {
        let mut c = classifier();
        let mut map = BucketMap::new();

        let filed = c.classify(
            entry(json!({"log_type": "app", "id": "a", "timestamp": null})),
            &mut map,
        );
        assert_eq!(filed, "app");
        assert_eq!(map.get("app").unwrap().first_seen().unwrap().timestamp, fixed_now());
    }

    #[test]
    fn test_no_timestamp_type_prefixing() {
        let fields = FieldNames::default();
        assert_eq!(fields.no_timestamp_type("app"), "unknown/app_no_timestamp");
        assert_eq!(
            fields.no_timestamp_type("unknown/unknown_type"),
            "unknown/unknown_type_no_timestamp"
        );
    }

    #[test]
    fn test_custom_field_names() {
        let fields = FieldNames {
            type_field: "kind".into(),
            timestamp_field: "@timestamp".into(),
            id_field: "request_id".into(),
            unknown_prefix: "_degraded".into(),
        };
        let mut c = Classifier::with_clock(fields, fixed_now);
        let mut map = BucketMap::new();

        let filed = c.classify(
            entry(json!({"kind": "audit", "request_id": 7, "@timestamp": "2024-01-02T03:04:05Z"})),
            &mut map,
        );
        assert_eq!(filed, "audit");
        assert_eq!(map.get("audit").unwrap().first_seen().unwrap().id, "7");

        let filed = c.classify(entry(json!({"request_id": 8})), &mut map);
        assert_eq!(filed, "_degraded/unknown_type_no_timestamp");
    }
}
