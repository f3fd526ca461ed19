use async_trait::async_trait;

use crate::core::error::Result;

/// A place uploaded files can be written to and removed from.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Persist `data` under `file_name` and return a URL clients can fetch it from
    async fn put(&self, file_name: &str, data: &[u8], content_type: &str) -> Result<String>;

    /// Remove the object behind `url`.
    ///
    /// `Ok(false)` means this backend does not hold the object.
    async fn remove(&self, url: &str) -> Result<bool>;
}
