//! Per-log-type accumulation
//!
//! A [`BucketMap`] owns one [`Bucket`] per log type, in the order types were
//! first seen. A bucket only comes into existence together with its first
//! entry, and its first-seen metadata is captured at that moment and never
//! touched again.

use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

use crate::entry::LogEntry;

/// Metadata captured from the first entry of a bucket; drives the object key.
///
/// The timestamp keeps the offset it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSeen {
    pub timestamp: DateTime<FixedOffset>,
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct Bucket {
    log_type: String,
    entries: Vec<LogEntry>,
    first_seen: Option<FirstSeen>,
}

impl Bucket {
    fn new(log_type: String) -> Self {
        Self {
            log_type,
            entries: Vec::new(),
            first_seen: None,
        }
    }

    pub fn log_type(&self) -> &str {
        &self.log_type
    }

    /// Entries in arrival order
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn first_seen(&self) -> Option<&FirstSeen> {
        self.first_seen.as_ref()
    }

    /// True once the first entry has been recorded
    pub fn is_initialized(&self) -> bool {
        self.first_seen.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record first-seen metadata. Returns false (and changes nothing) if the
    /// bucket was already initialized.
    fn initialize(&mut self, first_seen: FirstSeen) -> bool {
        if self.first_seen.is_some() {
            return false;
        }
        self.first_seen = Some(first_seen);
        true
    }
}

#[derive(Debug, Default, Clone)]
pub struct BucketMap {
    buckets: Vec<Bucket>,
    index: HashMap<String, usize>,
}

impl BucketMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry under `log_type`.
    ///
    /// `first_seen` is only invoked when this is the first entry for the
    /// type, so callers can defer timestamp parsing and id generation.
    pub fn append<F>(&mut self, log_type: &str, entry: LogEntry, first_seen: F)
    where
        F: FnOnce() -> FirstSeen,
    {
        let idx = match self.index.get(log_type) {
            Some(idx) => *idx,
            None => {
                let idx = self.buckets.len();
                self.buckets.push(Bucket::new(log_type.to_string()));
                self.index.insert(log_type.to_string(), idx);
                idx
            }
        };

        let bucket = &mut self.buckets[idx];
        if !bucket.is_initialized() {
            bucket.initialize(first_seen());
        }
        bucket.entries.push(entry);
    }

    pub fn contains(&self, log_type: &str) -> bool {
        self.index.contains_key(log_type)
    }

    pub fn get(&self, log_type: &str) -> Option<&Bucket> {
        self.index.get(log_type).map(|idx| &self.buckets[*idx])
    }

    /// Buckets in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total entries across all buckets
    pub fn entry_count(&self) -> usize {
        self.buckets.iter().map(Bucket::len).sum()
    }

    pub fn into_buckets(self) -> Vec<Bucket> {
        self.buckets
    }
}

impl IntoIterator for BucketMap {
    type Item = Bucket;
    type IntoIter = std::vec::IntoIter<Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}
