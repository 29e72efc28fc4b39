//! Object key construction
//!
//! Format: `{prefix}/{log_type}/{YYYY}-{MM}/{DD}/{YYYY}-{MM}-{DD}-{hh}:{mm}:{ss}-{id}.gz`
//!
//! The time components come from the bucket's first timestamp, in the offset
//! it was written with. The percent-encoded first id keeps keys from colliding
//! between invocations. `/` in the id is left as is, so it nests the key.

use crate::bucket::FirstSeen;

/// Build the storage key for a bucket.
///
/// An empty prefix drops the leading segment instead of producing `/app/...`.
pub fn object_key(prefix: &str, log_type: &str, first_seen: &FirstSeen) -> String {
    let stamp = first_seen
        .timestamp
        .format("%Y-%m/%d/%Y-%m-%d-%H:%M:%S");
    let id = encode_id(&first_seen.id);

    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        format!("{}/{}-{}.gz", log_type, stamp, id)
    } else {
        format!("{}/{}/{}-{}.gz", prefix, log_type, stamp, id)
    }
}

fn encode_id(id: &str) -> String {
    id.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}
