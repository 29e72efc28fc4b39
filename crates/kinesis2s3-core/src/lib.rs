// kinesis2s3-core - batch processing logic for Kinesis log shipping
//
// PURE processing: stream records → decoded entries → per-type buckets →
// gzipped NDJSON blobs with their object keys. No I/O, no async.
// Storage and the Lambda runtime live in the writer and lambda crates.

pub mod blob;
pub mod bucket;
pub mod classify;
pub mod deaggregate;
pub mod decode;
pub mod entry;
pub mod error;
pub mod key;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod timestamp;

// Re-export commonly used types
pub use blob::{encode_bucket, EncodedBlob};
pub use bucket::{Bucket, BucketMap, FirstSeen};
pub use classify::{ClassifyStats, Classifier, FieldNames};
pub use deaggregate::deaggregate;
pub use decode::{decode_payload, decode_record};
pub use entry::LogEntry;
pub use error::{DecodeError, EncodeError, NormalizeError, PipelineError};
pub use key::object_key;
pub use normalize::{normalize, Normalized, Skip};
pub use pipeline::{decode_and_classify, BatchOutcome};
pub use record::{KinesisData, RawRecord, UserRecord};
pub use timestamp::parse_timestamp;
