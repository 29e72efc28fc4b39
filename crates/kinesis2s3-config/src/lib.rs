// kinesis2s3-config - Runtime configuration
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority), KINESIS2S3_* and legacy names
// 2. Config file path from KINESIS2S3_CONFIG env var
// 3. Config file contents from KINESIS2S3_CONFIG_CONTENT env var
// 4. Built-in defaults (lowest priority)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{EnvSource, ENV_PREFIX};
pub use sources::StdEnvSource;

pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported storage backend: {0}. Supported: s3, fs, memory")]
    UnsupportedBackend(String),

    #[error("unsupported log format: {0}. Supported: text, json")]
    UnsupportedLogFormat(String),
}

/// Main runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logs: LogFieldsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where blobs are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Leading key segment, e.g. `logs`. Empty means keys start at the type.
    #[serde(default)]
    pub prefix: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Config>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs: Option<FsConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            prefix: String::new(),
            s3: None,
            fs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Fs,
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Fs => write!(f, "fs"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" | "aws" => Ok(StorageBackend::S3),
            "fs" | "filesystem" => Ok(StorageBackend::Fs),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::UnsupportedBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3Config {
    #[serde(default)]
    pub bucket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl S3Config {
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FsConfig {
    pub path: String,
}

/// Names of the entry fields used for classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFieldsConfig {
    pub type_field: String,
    pub timestamp_field: String,
    pub id_field: String,
    pub unknown_prefix: String,
}

impl Default for LogFieldsConfig {
    fn default() -> Self {
        Self {
            type_field: "log_type".to_string(),
            timestamp_field: "timestamp".to_string(),
            id_field: "id".to_string(),
            unknown_prefix: "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `kinesis2s3_core=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::UnsupportedLogFormat(s.to_string())),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config(&StdEnvSource)
    }

    /// Load configuration against a custom environment (useful for testing)
    pub fn load_with_env<E: EnvSource>(env: &E) -> Result<Self> {
        sources::load_config(env)
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides from a custom source.
    pub fn apply_env_overrides_from<E: EnvSource>(&mut self, env: &E) -> Result<()> {
        env_overrides::apply_env_overrides(self, env)
    }

    /// Validate the configuration, trimming a trailing `/` from the prefix.
    pub fn validate(&mut self) -> Result<()> {
        validation::validate_config(self)
    }
}
