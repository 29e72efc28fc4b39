//! Error types for the writer crate

use kinesis2s3_core::EncodeError;
use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Storage configuration missing or invalid
    E001InvalidConfig,
    /// E002: Object write failed
    E002WriteFailure,
    /// E003: Bucket could not be serialized or compressed
    E003EncodeFailure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001InvalidConfig => "E001",
            Self::E002WriteFailure => "E002",
            Self::E003EncodeFailure => "E003",
        }
    }
}

/// Errors raised while writing a single blob
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("[{code}] Invalid storage configuration: {message}")]
    InvalidConfig { code: &'static str, message: String },

    #[error("[{code}] Write to '{key}' failed: {message}")]
    WriteFailure {
        code: &'static str,
        key: String,
        message: String,
    },

    #[error("[{code}] {source}")]
    Encode {
        code: &'static str,
        #[source]
        source: EncodeError,
    },
}

impl WriterError {
    pub fn invalid_config(message: String) -> Self {
        Self::InvalidConfig {
            code: ErrorCode::E001InvalidConfig.as_str(),
            message,
        }
    }

    pub fn write_failure(key: &str, message: String) -> Self {
        Self::WriteFailure {
            code: ErrorCode::E002WriteFailure.as_str(),
            key: key.to_string(),
            message,
        }
    }

    pub fn encode(source: EncodeError) -> Self {
        Self::Encode {
            code: ErrorCode::E003EncodeFailure.as_str(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { code, .. }
            | Self::WriteFailure { code, .. }
            | Self::Encode { code, .. } => code,
        }
    }
}

/// Outcome of the upload phase when at least one bucket failed
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{failed} of {attempted} uploads failed; first error: {first}")]
    Partial {
        failed: usize,
        attempted: usize,
        #[source]
        first: WriterError,
    },
}

/// Result type alias for WriterError
pub type Result<T> = std::result::Result<T, WriterError>;
