//! Blob storage capability and its OpenDAL implementation

use async_trait::async_trait;
use bytes::Bytes;
use kinesis2s3_config::{StorageBackend, StorageConfig};

use crate::{Result, WriterError};

/// Anything that can persist a blob under a key.
///
/// Writes are whole-object puts; an existing object under the same key is
/// replaced.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, body: Bytes) -> Result<()>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

/// OpenDAL-backed store (S3, local filesystem or in-memory)
#[derive(Clone)]
pub struct OpendalStore {
    operator: opendal::Operator,
    backend: &'static str,
}

impl OpendalStore {
    pub fn new(operator: opendal::Operator, backend: &'static str) -> Self {
        Self { operator, backend }
    }

    /// Build the operator for the configured backend.
    ///
    /// S3 credentials are discovered by OpenDAL (IAM role, environment, profile).
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let operator = match config.backend {
            StorageBackend::S3 => {
                let s3 = config.s3.as_ref().ok_or_else(|| {
                    WriterError::invalid_config("s3 config required for S3 backend".to_string())
                })?;

                let mut s3_builder = opendal::services::S3::default()
                    .bucket(&s3.bucket)
                    .region(s3.region());

                if let Some(endpoint) = &s3.endpoint {
                    s3_builder = s3_builder.endpoint(endpoint);
                }

                opendal::Operator::new(s3_builder)
                    .map_err(|e| {
                        WriterError::invalid_config(format!("Failed to create S3 operator: {}", e))
                    })?
                    .finish()
            }
            StorageBackend::Fs => {
                let fs = config.fs.as_ref().ok_or_else(|| {
                    WriterError::invalid_config(
                        "fs config required for filesystem backend".to_string(),
                    )
                })?;

                let fs_builder = opendal::services::Fs::default().root(&fs.path);
                opendal::Operator::new(fs_builder)
                    .map_err(|e| {
                        WriterError::invalid_config(format!(
                            "Failed to create filesystem operator: {}",
                            e
                        ))
                    })?
                    .finish()
            }
            StorageBackend::Memory => memory_operator()?,
        };

        tracing::debug!(backend = %config.backend, "Storage operator initialized");
        Ok(Self::new(operator, backend_name(config.backend)))
    }

    /// In-memory store, mostly for tests
    pub fn memory() -> Result<Self> {
        Ok(Self::new(memory_operator()?, "memory"))
    }

    pub fn operator(&self) -> &opendal::Operator {
        &self.operator
    }
}

#[async_trait]
impl BlobStore for OpendalStore {
    async fn put(&self, key: &str, body: Bytes) -> Result<()> {
        self.operator
            .write(key, body)
            .await
            .map_err(|e| WriterError::write_failure(key, e.to_string()))?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        self.backend
    }
}

fn memory_operator() -> Result<opendal::Operator> {
    Ok(opendal::Operator::new(opendal::services::Memory::default())
        .map_err(|e| {
            WriterError::invalid_config(format!("Failed to create memory operator: {}", e))
        })?
        .finish())
}

fn backend_name(backend: StorageBackend) -> &'static str {
    match backend {
        StorageBackend::S3 => "s3",
        StorageBackend::Fs => "fs",
        StorageBackend::Memory => "memory",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinesis2s3_config::{FsConfig, S3Config};

    #[tokio::test]
    async fn test_memory_put_and_read_back() {
        let store = OpendalStore::memory().unwrap();
        store
            .put("logs/app/a.gz", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        let read = store.operator().read("logs/app/a.gz").await.unwrap();
        assert_eq!(read.to_vec(), b"hello");
        assert_eq!(store.backend(), "memory");
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = OpendalStore::memory().unwrap();
        store.put("k.gz", Bytes::from_static(b"one")).await.unwrap();
        store.put("k.gz", Bytes::from_static(b"two")).await.unwrap();

        let read = store.operator().read("k.gz").await.unwrap();
        assert_eq!(read.to_vec(), b"two");
    }

    #[test]
    fn test_from_config_requires_backend_section() {
        let config = StorageConfig {
            backend: StorageBackend::S3,
            ..StorageConfig::default()
        };
        let err = OpendalStore::from_config(&config).err().unwrap();
        assert_eq!(err.code(), "E001");

        let config = StorageConfig {
            backend: StorageBackend::Fs,
            ..StorageConfig::default()
        };
        assert!(OpendalStore::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_builds_operators() {
        let s3 = StorageConfig {
            backend: StorageBackend::S3,
            s3: Some(S3Config {
                bucket: "logs-bucket".to_string(),
                region: Some("eu-west-1".to_string()),
                endpoint: Some("http://localhost:9000".to_string()),
            }),
            ..StorageConfig::default()
        };
        assert_eq!(OpendalStore::from_config(&s3).unwrap().backend(), "s3");

        let fs = StorageConfig {
            backend: StorageBackend::Fs,
            fs: Some(FsConfig {
                path: std::env::temp_dir().to_string_lossy().into_owned(),
            }),
            ..StorageConfig::default()
        };
        assert_eq!(OpendalStore::from_config(&fs).unwrap().backend(), "fs");
    }
}
