//! Error types for the decode/normalize/classify pipeline
//!
//! Everything in here is fatal for the invocation. Per-record problems that
//! are expected in production (non-JSON payloads, control messages, broken
//! inner events) travel through [`crate::normalize::Skip`] instead.

use thiserror::Error;

/// Transport-level corruption of a single record
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("record data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("gzip payload could not be decompressed: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Protocol violations found while unwrapping envelopes
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("unknown messageType {message_type}")]
    UnknownMessageType { message_type: String },
}

/// Failure while turning a bucket into an uploadable blob
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to serialize entry {index} of '{log_type}': {source}")]
    Serialize {
        log_type: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("gzip compression failed for '{log_type}': {source}")]
    Compress {
        log_type: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bucket '{0}' has no entries")]
    EmptyBucket(String),
}

/// Any fatal error raised by the batch pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("record {sequence_number}: {source}")]
    Decode {
        sequence_number: String,
        #[source]
        source: DecodeError,
    },

    #[error("record {sequence_number}: {source}")]
    Normalize {
        sequence_number: String,
        #[source]
        source: NormalizeError,
    },
}
