//! Local filesystem storage
//!
//! Fallback backend used when MinIO is not configured or unreachable. Files
//! land in the upload directory and are served back under `/uploads`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::modules::storage::backend::StorageBackend;
use crate::shared::constants::UPLOADS_ROUTE;

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory files are written to and served from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload directory if it is missing
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload directory '{}': {}",
                self.root.display(),
                e
            ))
        })
    }

    /// Resolve a `/uploads/<name>` URL to a path inside the upload directory
    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let encoded = url.strip_prefix(UPLOADS_ROUTE)?.strip_prefix('/')?;
        let decoded = urlencoding::decode(encoded).ok()?;
        // Only the final component is honoured so a URL can never escape the root
        let file_name = Path::new(decoded.as_ref()).file_name()?;
        Some(self.root.join(file_name))
    }
}

#[async_trait]
impl StorageBackend for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn put(&self, file_name: &str, data: &[u8], _content_type: &str) -> Result<String> {
        self.ensure_dir().await?;

        let path = self.root.join(file_name);
        tokio::fs::write(&path, data).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to write file '{}': {}",
                path.display(),
                e
            ))
        })?;

        debug!("Stored {} bytes at {}", data.len(), path.display());
        Ok(format!(
            "{}/{}",
            UPLOADS_ROUTE,
            urlencoding::encode(file_name)
        ))
    }

    async fn remove(&self, url: &str) -> Result<bool> {
        let Some(path) = self.path_for_url(url) else {
            return Ok(false);
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed local file {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to remove file '{}': {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("uploads"));

        let url = store
            .put("123-456-paper one.pdf", b"%PDF-1.4", "application/pdf")
            .await
            .unwrap();
        assert_eq!(url, "/uploads/123-456-paper%20one.pdf");

        let on_disk = dir.path().join("uploads").join("123-456-paper one.pdf");
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"%PDF-1.4");

        assert!(store.remove(&url).await.unwrap());
        assert!(!on_disk.exists());

        // Second removal finds nothing
        assert!(!store.remove(&url).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_ignores_foreign_urls() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        assert!(!store
            .remove("http://minio:9000/article-uploads/public/a.pdf")
            .await
            .unwrap());
        assert!(!store.remove("/uploads/").await.unwrap());
    }

    #[test]
    fn test_path_for_url_stays_inside_root() {
        let store = LocalStore::new("/srv/uploads");

        assert_eq!(
            store.path_for_url("/uploads/..%2F..%2Fetc%2Fpasswd"),
            Some(PathBuf::from("/srv/uploads/passwd"))
        );
        assert_eq!(store.path_for_url("/uploads/.."), None);
    }
}
