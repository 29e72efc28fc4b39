// kinesis2s3-writer - Blob storage and the upload phase
//
// Core produces keyed, gzipped blobs; this crate owns where they go.
// `BlobStore` is the seam: OpenDAL in production, test doubles elsewhere.

mod error;
mod storage;
mod upload;

pub use error::{ErrorCode, Result, UploadError, WriterError};
pub use storage::{BlobStore, OpendalStore};
pub use upload::{upload_buckets, UploadReport, WrittenObject};
