//! Ordered storage chain
//!
//! Every operation is tried against the backends in order until one of them
//! succeeds. The usual chain is MinIO followed by the local upload directory.

use std::sync::Arc;

use chrono::Utc;
use rand_core::{OsRng, RngCore};
use tracing::{info, warn};

use crate::core::error::{AppError, Result};
use crate::modules::storage::backend::StorageBackend;

/// Where a file ended up after a successful store
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub url: String,
    pub file_name: String,
    pub backend: &'static str,
}

#[derive(Clone)]
pub struct FallbackStorage {
    backends: Vec<Arc<dyn StorageBackend>>,
}

impl FallbackStorage {
    pub fn new(backends: Vec<Arc<dyn StorageBackend>>) -> Self {
        Self { backends }
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Store a file under a fresh unique name using the first backend that accepts it
    pub async fn store(
        &self,
        data: &[u8],
        original_name: &str,
        content_type: &str,
    ) -> Result<StoredFile> {
        let file_name = unique_file_name(original_name);
        let mut failures = Vec::new();

        for backend in &self.backends {
            match backend.put(&file_name, data, content_type).await {
                Ok(url) => {
                    if !failures.is_empty() {
                        warn!(
                            "Stored '{}' with fallback backend '{}' after failures: {}",
                            file_name,
                            backend.name(),
                            failures.join("; ")
                        );
                    }
                    info!("Stored '{}' via {} at {}", file_name, backend.name(), url);
                    return Ok(StoredFile {
                        url,
                        file_name,
                        backend: backend.name(),
                    });
                }
                Err(e) => {
                    warn!("Storage backend '{}' failed: {}", backend.name(), e);
                    failures.push(format!("{}: {}", backend.name(), e));
                }
            }
        }

        if failures.is_empty() {
            return Err(AppError::Storage(
                "No storage backend configured".to_string(),
            ));
        }

        Err(AppError::Storage(format!(
            "Failed to store file: {}",
            failures.join("; ")
        )))
    }

    /// Remove the file behind `url` from whichever backend holds it.
    ///
    /// Failures are logged and never surfaced; returns whether any backend
    /// reported a removal.
    pub async fn delete(&self, url: &str) -> bool {
        if url.is_empty() {
            return false;
        }

        for backend in &self.backends {
            match backend.remove(url).await {
                Ok(true) => {
                    info!("Removed {} via {}", url, backend.name());
                    return true;
                }
                Ok(false) => continue,
                Err(e) => {
                    warn!(
                        "Storage backend '{}' failed to remove {}: {}",
                        backend.name(),
                        url,
                        e
                    );
                }
            }
        }

        warn!("No storage backend removed {}", url);
        false
    }
}

/// Longest file name most filesystems accept, in bytes
const MAX_FILE_NAME_BYTES: usize = 255;

/// `<unix millis>-<random below 1e9>-<sanitized original name>`, at most
/// 255 bytes with the extension kept
pub fn unique_file_name(original_name: &str) -> String {
    // Length is enforced below, where the extension can be kept
    let options = sanitize_filename::Options {
        truncate: false,
        ..Default::default()
    };
    let sanitized = sanitize_filename::sanitize_with_options(original_name.trim(), options)
        .replace(char::is_whitespace, "_");
    let base = if sanitized.is_empty() {
        "file".to_string()
    } else {
        sanitized
    };

    let prefix = format!(
        "{}-{}-",
        Utc::now().timestamp_millis(),
        OsRng.next_u32() % 1_000_000_000
    );
    let base = truncate_file_name(&base, MAX_FILE_NAME_BYTES - prefix.len());

    format!("{}{}", prefix, base)
}

/// Shorten the stem so `name` fits in `max_bytes`, on a char boundary
fn truncate_file_name(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= max_bytes / 2 => name.split_at(dot),
        _ => (name, ""),
    };

    let mut end = max_bytes - extension.len();
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &stem[..end], extension)
}
