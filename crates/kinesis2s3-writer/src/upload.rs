// Upload phase: one gzipped NDJSON object per bucket
//
// Buckets are written sequentially in first-seen order. A failing bucket does
// not stop the loop; the batch is reported as failed afterwards so the stream
// redelivers it. Keys are deterministic for a given batch, so redelivery
// overwrites rather than duplicates.

use bytes::Bytes;
use kinesis2s3_core::{encode_bucket, BucketMap};

use crate::storage::BlobStore;
use crate::{UploadError, WriterError};

/// One successfully written object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenObject {
    pub log_type: String,
    pub key: String,
    pub record_count: usize,
    pub compressed_bytes: usize,
}

/// Objects written by a successful upload phase, in bucket order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub objects: Vec<WrittenObject>,
}

impl UploadReport {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(|o| o.key.as_str())
    }

    pub fn record_count(&self) -> usize {
        self.objects.iter().map(|o| o.record_count).sum()
    }
}

/// Encode and write every bucket.
pub async fn upload_buckets(
    store: &dyn BlobStore,
    buckets: &BucketMap,
    prefix: &str,
) -> Result<UploadReport, UploadError> {
    let mut report = UploadReport::default();
    let mut failures: Vec<WriterError> = Vec::new();
    let mut attempted = 0;

    for bucket in buckets.iter() {
        attempted += 1;
        let log_type = bucket.log_type();
        tracing::info!(log_type, count = bucket.len(), "Processing log type");

        let blob = match encode_bucket(bucket, prefix) {
            Ok(blob) => blob,
            Err(err) => {
                tracing::error!(log_type, error = %err, "Failed to encode bucket");
                failures.push(WriterError::encode(err));
                continue;
            }
        };

        tracing::info!(
            log_type,
            key = %blob.key,
            backend = store.backend(),
            count = blob.record_count,
            bytes = blob.body.len(),
            uncompressed_bytes = blob.uncompressed_bytes,
            "Starting upload"
        );

        let compressed_bytes = blob.body.len();
        match store.put(&blob.key, Bytes::from(blob.body)).await {
            Ok(()) => {
                tracing::debug!(log_type, key = %blob.key, "Upload complete");
                report.objects.push(WrittenObject {
                    log_type: blob.log_type,
                    key: blob.key,
                    record_count: blob.record_count,
                    compressed_bytes,
                });
            }
            Err(err) => {
                tracing::error!(log_type, key = %blob.key, error = %err, "Upload failed");
                failures.push(err);
            }
        }
    }

    let failed = failures.len();
    if let Some(first) = failures.into_iter().next() {
        return Err(UploadError::Partial {
            failed,
            attempted,
            first,
        });
    }

    tracing::info!(
        objects = report.objects.len(),
        count = report.record_count(),
        "Uploaded all buckets"
    );
    Ok(report)
}
