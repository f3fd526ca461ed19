use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};

/// Allowed MIME types for article uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png"];

/// Kind of file attached to an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "article_file_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Jpg,
    Jpeg,
    Png,
}

impl FileType {
    pub fn from_mime_type(content_type: &str) -> Option<Self> {
        match content_type {
            "application/pdf" => Some(FileType::Pdf),
            "image/jpeg" => Some(FileType::Jpeg),
            "image/png" => Some(FileType::Png),
            _ => None,
        }
    }
}

/// Type and size limits applied to uploads before anything is stored
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    max_file_size: usize,
}

impl UploadPolicy {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate a file and return the article file type it maps to
    pub fn check(&self, content_type: &str, size: usize) -> Result<FileType> {
        if size == 0 {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }

        if size > self.max_file_size {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {} bytes ({} MB)",
                self.max_file_size,
                self.max_file_size / 1024 / 1024
            )));
        }

        // Parameters such as "; charset=binary" are not part of the type
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        FileType::from_mime_type(&essence).ok_or_else(|| {
            AppError::BadRequest(format!(
                "File type '{}' is not allowed. Allowed types: {}",
                content_type,
                ALLOWED_MIME_TYPES.join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_types_map_to_file_type() {
        let policy = UploadPolicy::new(1024);

        assert_eq!(policy.check("application/pdf", 10).unwrap(), FileType::Pdf);
        assert_eq!(policy.check("image/jpeg", 10).unwrap(), FileType::Jpeg);
        assert_eq!(policy.check("IMAGE/PNG", 10).unwrap(), FileType::Png);
        assert_eq!(
            policy.check("application/pdf; charset=binary", 10).unwrap(),
            FileType::Pdf
        );
    }

    #[test]
    fn test_rejects_other_types() {
        let policy = UploadPolicy::new(1024);

        assert!(matches!(
            policy.check("image/gif", 10),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            policy.check("application/octet-stream", 10),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_size_limits() {
        let policy = UploadPolicy::new(1024);

        assert!(policy.check("application/pdf", 1024).is_ok());
        assert!(matches!(
            policy.check("application/pdf", 1025),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            policy.check("application/pdf", 0),
            Err(AppError::BadRequest(_))
        ));
    }
}
