// Process-wide initialization: logging and storage

use anyhow::Result;
use kinesis2s3_config::{LogFormat, LoggingConfig, RuntimeConfig};
use kinesis2s3_core::FieldNames;
use kinesis2s3_writer::OpendalStore;
use std::sync::Arc;
use tracing::info;

use crate::HandlerState;

/// Initialize tracing/logging from config
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init_tracing(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Try to set the global subscriber; ignore error if already set (idempotent)
    let _ = match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().without_time()),
        ),
        LogFormat::Text => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().without_time()))
        }
    };
}

/// Build the handler state shared by every invocation
pub fn init_state(config: &RuntimeConfig) -> Result<HandlerState> {
    info!(
        "Initializing writer with storage backend: {}",
        config.storage.backend
    );
    if let Some(s3) = config.storage.s3.as_ref() {
        info!(
            "Using S3 storage: bucket={}, region={}",
            s3.bucket,
            s3.region()
        );
    }

    let store = OpendalStore::from_config(&config.storage)
        .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?;

    Ok(HandlerState {
        store: Arc::new(store),
        fields: field_names(config),
        prefix: config.storage.prefix.clone(),
    })
}

pub(crate) fn field_names(config: &RuntimeConfig) -> FieldNames {
    FieldNames {
        type_field: config.logs.type_field.clone(),
        timestamp_field: config.logs.timestamp_field.clone(),
        id_field: config.logs.id_field.clone(),
        unknown_prefix: config.logs.unknown_prefix.clone(),
    }
}
