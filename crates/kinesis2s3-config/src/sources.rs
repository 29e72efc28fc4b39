// Configuration source loading
//
// Priority order:
// 1. Environment variables (KINESIS2S3_* prefix, then legacy names)
// 2. Config file path from KINESIS2S3_CONFIG
// 3. Inline config content from KINESIS2S3_CONFIG_CONTENT
// 4. Defaults

use crate::env_overrides::{self, EnvSource, ENV_PREFIX};
use crate::*;
use anyhow::{Context, Result};
use std::env;

/// Load configuration, reading files and variables through `env`.
pub fn load_config<E: EnvSource>(env: &E) -> Result<RuntimeConfig> {
    let mut config = load_from_file(env)?.unwrap_or_default();
    env_overrides::apply_env_overrides(&mut config, env)?;
    config.validate()?;
    Ok(config)
}

fn load_from_file<E: EnvSource>(env: &E) -> Result<Option<RuntimeConfig>> {
    if let Some(path) = env.get("CONFIG") {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: RuntimeConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        return Ok(Some(config));
    }

    if let Some(content) = env.get("CONFIG_CONTENT") {
        let config: RuntimeConfig = toml::from_str(&content)
            .context("Failed to parse inline config from KINESIS2S3_CONFIG_CONTENT")?;
        return Ok(Some(config));
    }

    Ok(None)
}

/// Process environment
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}
