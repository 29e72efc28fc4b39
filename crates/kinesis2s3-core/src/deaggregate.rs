//! Kinesis Producer Library (KPL) deaggregation
//!
//! KPL packs many user records into one stream record:
//!
//! ```text
//! F3 89 9A C2 | protobuf AggregatedRecord | 16 byte MD5 of the protobuf
//! ```
//!
//! Records without the magic prefix, whose digest does not match the body, or
//! whose body does not decode as an `AggregatedRecord`, are passed through
//! untouched as a single user record.

use md5::{Digest, Md5};
use prost::Message;

use crate::decode::decode_base64;
use crate::error::PipelineError;
use crate::record::{RawRecord, UserRecord};

/// KPL aggregated record magic prefix
pub const KPL_MAGIC: [u8; 4] = [0xf3, 0x89, 0x9a, 0xc2];
const DIGEST_LEN: usize = 16;

#[derive(Clone, PartialEq, Message)]
pub struct AggregatedRecord {
    #[prost(string, repeated, tag = "1")]
    pub partition_key_table: Vec<String>,
    #[prost(string, repeated, tag = "2")]
    pub explicit_hash_key_table: Vec<String>,
    #[prost(message, repeated, tag = "3")]
    pub records: Vec<AggregatedEntry>,
}

#[derive(Clone, PartialEq, Message)]
pub struct AggregatedEntry {
    #[prost(uint64, required, tag = "1")]
    pub partition_key_index: u64,
    #[prost(uint64, optional, tag = "2")]
    pub explicit_hash_key_index: Option<u64>,
    #[prost(bytes = "vec", required, tag = "3")]
    pub data: Vec<u8>,
    #[prost(message, repeated, tag = "4")]
    pub tags: Vec<Tag>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Tag {
    #[prost(string, required, tag = "1")]
    pub key: String,
    #[prost(string, optional, tag = "2")]
    pub value: Option<String>,
}

/// Expand a batch of stream records into individual user records.
///
/// Order is preserved: records keep their batch order and aggregated
/// records expand in place.
pub fn deaggregate(records: &[RawRecord]) -> Result<Vec<UserRecord>, PipelineError> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let bytes =
            decode_base64(&record.kinesis.data).map_err(|source| PipelineError::Decode {
                sequence_number: record.sequence_number().to_string(),
                source,
            })?;
        out.extend(deaggregate_bytes(
            &record.kinesis.partition_key,
            record.sequence_number(),
            bytes,
        ));
    }
    Ok(out)
}

/// Expand one record's decoded bytes.
pub fn deaggregate_bytes(
    partition_key: &str,
    sequence_number: &str,
    bytes: Vec<u8>,
) -> Vec<UserRecord> {
    let passthrough = |data: Vec<u8>| {
        vec![UserRecord {
            partition_key: partition_key.to_string(),
            sequence_number: sequence_number.to_string(),
            sub_sequence_number: None,
            data,
        }]
    };

    if !is_aggregated(&bytes) {
        return passthrough(bytes);
    }

    let digest_start = bytes.len() - DIGEST_LEN;
    let body = &bytes[KPL_MAGIC.len()..digest_start];
    let digest = &bytes[digest_start..];
    if Md5::digest(body).as_slice() != digest {
        tracing::warn!(
            sequence_number,
            "Record carries KPL magic but its digest does not match, passing through"
        );
        return passthrough(bytes);
    }

    let aggregated = match AggregatedRecord::decode(body) {
        Ok(aggregated) => aggregated,
        Err(err) => {
            tracing::warn!(
                sequence_number,
                error = %err,
                "Record carries KPL magic but is not an aggregate, passing through"
            );
            return passthrough(bytes);
        }
    };

    tracing::debug!(
        sequence_number,
        count = aggregated.records.len(),
        "Deaggregated KPL record"
    );

    let AggregatedRecord {
        partition_key_table,
        records,
        ..
    } = aggregated;

    records
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            let partition_key = usize::try_from(entry.partition_key_index)
                .ok()
                .and_then(|i| partition_key_table.get(i))
                .cloned()
                .unwrap_or_else(|| partition_key.to_string());
            UserRecord {
                partition_key,
                sequence_number: sequence_number.to_string(),
                sub_sequence_number: Some(idx as u64),
                data: entry.data,
            }
        })
        .collect()
}

fn is_aggregated(bytes: &[u8]) -> bool {
    bytes.len() > KPL_MAGIC.len() + DIGEST_LEN && bytes[..KPL_MAGIC.len()] == KPL_MAGIC
}
