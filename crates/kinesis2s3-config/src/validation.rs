// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{anyhow, bail, Result};
use tracing::warn;

pub fn validate_config(config: &mut RuntimeConfig) -> Result<()> {
    validate_storage_config(&mut config.storage)?;
    validate_log_fields(&config.logs)?;
    Ok(())
}

fn validate_storage_config(config: &mut StorageConfig) -> Result<()> {
    if config.prefix.ends_with('/') {
        let trimmed = config.prefix.trim_end_matches('/').to_string();
        warn!(
            prefix = %config.prefix,
            trimmed = %trimmed,
            "storage.prefix has a trailing '/', trimming"
        );
        config.prefix = trimmed;
    }

    match config.backend {
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or_else(|| anyhow!("s3 storage backend requires a bucket (storage.s3.bucket or LOG_S3_BUCKET)"))?;

            if s3.bucket.is_empty() {
                bail!("storage.s3.bucket is required for S3 backend");
            }
        }
        StorageBackend::Fs => {
            let fs = config
                .fs
                .as_ref()
                .ok_or_else(|| anyhow!("fs storage backend requires 'storage.fs.path'"))?;

            if fs.path.is_empty() {
                bail!("storage.fs.path must not be empty");
            }
        }
        StorageBackend::Memory => {
            warn!("memory storage backend selected; blobs are discarded when the process exits");
        }
    }

    Ok(())
}

fn validate_log_fields(config: &LogFieldsConfig) -> Result<()> {
    for (name, value) in [
        ("logs.type_field", &config.type_field),
        ("logs.timestamp_field", &config.timestamp_field),
        ("logs.id_field", &config.id_field),
        ("logs.unknown_prefix", &config.unknown_prefix),
    ] {
        if value.is_empty() {
            bail!("{} must not be empty", name);
        }
    }

    if config.unknown_prefix.ends_with('/') {
        bail!(
            "logs.unknown_prefix must not end with '/': {}",
            config.unknown_prefix
        );
    }

    Ok(())
}
