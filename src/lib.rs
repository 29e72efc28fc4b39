// kinesis2s3 - ship Kinesis log batches to object storage
//
// Facade over the workspace crates:
// - core: decode, normalize, classify, encode (pure), re-exported at the root
// - config: defaults, TOML, environment
// - writer: blob storage and the upload phase
// - lambda: the AWS Lambda adapter

pub use kinesis2s3_config as config;
pub use kinesis2s3_lambda as lambda;
pub use kinesis2s3_writer as writer;

pub use kinesis2s3_config::RuntimeConfig;
pub use kinesis2s3_core::{
    decode_and_classify, BatchOutcome, Classifier, FieldNames, LogEntry, PipelineError,
    RawRecord,
};
pub use kinesis2s3_lambda::{process_records, HandlerState, InvocationSummary, KinesisEvent};
pub use kinesis2s3_writer::{upload_buckets, BlobStore, OpendalStore, UploadError, UploadReport};
