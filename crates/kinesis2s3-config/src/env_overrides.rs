use super::{FsConfig, LogFormat, RuntimeConfig, S3Config, StorageBackend};
use anyhow::{Context, Result};

pub const ENV_PREFIX: &str = "KINESIS2S3_";

/// Abstraction over environment-variable lookups so tests can supply their
/// own source of overrides.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;

    /// Get an environment variable WITHOUT the KINESIS2S3_ prefix
    /// Used for legacy deployment variables and AWS standard variables
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
///
/// Prefixed names win over the legacy unprefixed ones.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Storage backend
    if let Some(backend) = get_env_string(env, "STORAGE_BACKEND") {
        config.storage.backend = backend
            .parse::<StorageBackend>()
            .context("Invalid KINESIS2S3_STORAGE_BACKEND value")?;
    }
    if let Some(prefix) = get_env_or_legacy(env, "PREFIX", "LOG_S3_PREFIX") {
        config.storage.prefix = prefix;
    }

    // Filesystem storage
    if let Some(path) = get_env_string(env, "STORAGE_PATH") {
        config.storage.fs.get_or_insert_with(FsConfig::default).path = path;
    }

    // S3 storage
    if let Some(bucket) = get_env_or_legacy(env, "S3_BUCKET", "LOG_S3_BUCKET") {
        ensure_s3(config).bucket = bucket;
    }
    if let Some(region) = get_env_string(env, "S3_REGION") {
        ensure_s3(config).region = Some(region);
    }
    if let Some(endpoint) = get_env_string(env, "S3_ENDPOINT") {
        ensure_s3(config).endpoint = Some(endpoint);
    } else if let Some(endpoint) = get_raw_env_string(env, "AWS_ENDPOINT_URL") {
        ensure_s3(config).endpoint = Some(endpoint);
    }
    // The Lambda runtime always sets AWS_REGION; only use it when nothing
    // more specific was configured.
    if let Some(s3) = config.storage.s3.as_mut() {
        if s3.region.is_none() {
            s3.region = get_raw_env_string(env, "AWS_REGION");
        }
    }

    // Classification fields
    if let Some(field) = get_env_or_legacy(env, "LOG_TYPE_FIELD", "LOG_TYPE_FIELD") {
        config.logs.type_field = field;
    }
    if let Some(field) = get_env_or_legacy(env, "LOG_TIMESTAMP_FIELD", "LOG_TIMESTAMP_FIELD") {
        config.logs.timestamp_field = field;
    }
    if let Some(field) = get_env_or_legacy(env, "LOG_ID_FIELD", "LOG_ID_FIELD") {
        config.logs.id_field = field;
    }
    if let Some(prefix) =
        get_env_or_legacy(env, "LOG_TYPE_UNKNOWN_PREFIX", "LOG_TYPE_UNKNOWN_PREFIX")
    {
        config.logs.unknown_prefix = prefix;
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.logging.format = format
            .parse::<LogFormat>()
            .context("Invalid KINESIS2S3_LOG_FORMAT value")?;
    }

    Ok(())
}

fn ensure_s3(config: &mut RuntimeConfig) -> &mut S3Config {
    config.storage.s3.get_or_insert_with(S3Config::default)
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key)
}

/// Get a raw environment variable without the KINESIS2S3_ prefix
fn get_raw_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get_raw(key)
}

fn get_env_or_legacy<E: EnvSource>(env: &E, key: &str, legacy: &str) -> Option<String> {
    get_env_string(env, key).or_else(|| get_raw_env_string(env, legacy))
}
