// Bucket serialization: newline-delimited JSON, gzip at the best ratio
//
// Runs once per bucket per invocation, so level 9 is affordable.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

use crate::bucket::Bucket;
use crate::entry::LogEntry;
use crate::error::EncodeError;
use crate::key::object_key;

/// A bucket ready to be written to storage
#[derive(Debug, Clone)]
pub struct EncodedBlob {
    pub log_type: String,
    pub key: String,
    pub body: Vec<u8>,
    pub record_count: usize,
    pub uncompressed_bytes: usize,
}

/// Render entries as one JSON document per line, in order, no trailing newline.
pub fn serialize_entries(log_type: &str, entries: &[LogEntry]) -> Result<String, EncodeError> {
    let mut lines = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let line = entry
            .to_json_line()
            .map_err(|source| EncodeError::Serialize {
                log_type: log_type.to_string(),
                index,
                source,
            })?;
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

pub fn gzip_best(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Serialize, compress and key a bucket.
pub fn encode_bucket(bucket: &Bucket, prefix: &str) -> Result<EncodedBlob, EncodeError> {
    let log_type = bucket.log_type();
    let first_seen = match bucket.first_seen() {
        Some(first_seen) if !bucket.is_empty() => first_seen,
        _ => return Err(EncodeError::EmptyBucket(log_type.to_string())),
    };

    let text = serialize_entries(log_type, bucket.entries())?;
    let body = gzip_best(text.as_bytes()).map_err(|source| EncodeError::Compress {
        log_type: log_type.to_string(),
        source,
    })?;

    Ok(EncodedBlob {
        log_type: log_type.to_string(),
        key: object_key(prefix, log_type, first_seen),
        body,
        record_count: bucket.len(),
        uncompressed_bytes: text.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::{BucketMap, FirstSeen};
    use chrono::{TimeZone, Utc};
    use flate2::read::GzDecoder;
    use serde_json::json;
    use std::io::Read;

    fn gunzip(data: &[u8]) -> String {
        let mut out = String::new();
        GzDecoder::new(data).read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_encode_bucket() {
        let mut map = BucketMap::new();
        let first = FirstSeen {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap().fixed_offset(),
            id: "abc".into(),
        };
        for n in 0..3 {
            let entry = LogEntry::from_value(json!({"log_type": "app", "n": n})).unwrap();
            map.append("app", entry, || first.clone());
        }

        let blob = encode_bucket(map.get("app").unwrap(), "logs").unwrap();
        assert_eq!(blob.key, "logs/app/2024-01/02/2024-01-02-03:04:05-abc.gz");
        assert_eq!(blob.record_count, 3);

        let text = gunzip(&blob.body);
        assert_eq!(blob.uncompressed_bytes, text.len());
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(
            lines,
            vec![
                r#"{"log_type":"app","n":0}"#,
                r#"{"log_type":"app","n":1}"#,
                r#"{"log_type":"app","n":2}"#,
            ]
        );
    }

    #[test]
    fn test_serialize_single_entry_has_no_newline() {
        let entries = vec![LogEntry::from_value(json!({"a": "line\nbreak"})).unwrap()];
        let text = serialize_entries("t", &entries).unwrap();
        assert_eq!(text, r#"{"a":"line\nbreak"}"#);
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_gzip_best_roundtrip() {
        let data = "x".repeat(10_000);
        let compressed = gzip_best(data.as_bytes()).unwrap();
        assert!(compressed.len() < 200);
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
        assert_eq!(gunzip(&compressed), data);
    }
}
