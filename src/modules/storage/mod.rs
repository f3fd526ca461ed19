//! Storage module for uploaded files
//!
//! Provides a MinIO/S3-compatible client and a local filesystem store behind a
//! common backend trait, chained together by [`FallbackStorage`].

mod backend;
mod fallback;
mod local_store;
mod minio_client;
mod upload_policy;

pub use backend::StorageBackend;
pub use fallback::{FallbackStorage, StoredFile};
pub use local_store::LocalStore;
pub use minio_client::MinIOClient;
pub use upload_policy::{FileType, UploadPolicy};
