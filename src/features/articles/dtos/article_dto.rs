use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::articles::models::{Article, ArticleStatus, FileType};
use crate::shared::types::PaginationQuery;

/// Text fields of an article submission, read from the multipart form
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateArticleDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,

    #[validate(length(
        min = 1,
        max = 2000,
        message = "Description must be 1-2000 characters"
    ))]
    pub description: String,
}

impl CreateArticleDto {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }
}

/// Article submission form for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateArticleForm {
    #[schema(example = "On the Shape of Rivers")]
    pub title: String,
    /// Byline shown with the article, independent of the submitting account
    #[schema(example = "Jane Doe")]
    pub author: String,
    pub description: String,
    /// PDF, JPEG or PNG file
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Review decision
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateArticleStatusDto {
    pub status: ArticleStatus,
    /// Replaces the existing feedback when non-empty
    #[serde(default)]
    pub feedback: Option<String>,
}

impl UpdateArticleStatusDto {
    /// Feedback to store, if any was actually given
    pub fn feedback(&self) -> Option<&str> {
        self.feedback
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }
}

/// Query parameters for listing articles
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ArticleListQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,

    /// Only return articles with this status
    pub status: Option<ArticleStatus>,
}

fn default_page() -> i64 {
    PaginationQuery::default().page
}

fn default_limit() -> i64 {
    PaginationQuery::default().limit
}

impl ArticleListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.limit)
    }
}

/// Submitting account, as shown alongside an article
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitterDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponseDto {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub description: String,
    pub status: ArticleStatus,
    /// Where the attached file can be fetched from
    pub file_url: String,
    pub file_type: FileType,
    pub submitted_by: SubmitterDto,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Article> for ArticleResponseDto {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            author: article.author,
            description: article.description,
            status: article.status,
            file_url: article.file_url,
            file_type: article.file_type,
            submitted_by: SubmitterDto {
                id: article.submitted_by,
                username: article.submitter_username,
                email: article.submitter_email,
            },
            feedback: article.feedback,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteArticleResponseDto {
    pub id: Uuid,
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::sample_article;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    fn create(title: &str, author: &str, description: &str) -> CreateArticleDto {
        CreateArticleDto {
            title: title.to_string(),
            author: author.to_string(),
            description: description.to_string(),
        }
        .normalized()
    }

    #[test]
    fn test_create_article_valid() {
        let description: String = Sentence(3..8).fake();
        assert!(create("T", "A", &description).validate().is_ok());
    }

    #[test]
    fn test_title_length_boundary() {
        assert!(create(&"t".repeat(200), "A", "D").validate().is_ok());
        assert!(create(&"t".repeat(201), "A", "D").validate().is_err());
    }

    #[test]
    fn test_lengths_count_characters() {
        assert!(create(&"é".repeat(200), "A", "D").validate().is_ok());
        assert!(create("T", "A", &"ü".repeat(2000)).validate().is_ok());
        assert!(create("T", "A", &"ü".repeat(2001)).validate().is_err());
    }

    #[test]
    fn test_whitespace_only_fields_are_missing() {
        let errors = create("   ", " ", "\n").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("author"));
        assert!(fields.contains_key("description"));
    }

    #[test]
    fn test_feedback_ignores_blank_values() {
        let dto = |feedback: Option<&str>| UpdateArticleStatusDto {
            status: ArticleStatus::Approved,
            feedback: feedback.map(str::to_string),
        };

        assert_eq!(dto(None).feedback(), None);
        assert_eq!(dto(Some("  ")).feedback(), None);
        assert_eq!(dto(Some(" Good ")).feedback(), Some("Good"));
    }

    #[test]
    fn test_response_uses_camel_case_and_nests_submitter() {
        let article = sample_article(Uuid::new_v4());
        let json = serde_json::to_value(ArticleResponseDto::from(article.clone())).unwrap();

        assert_eq!(json["fileUrl"], article.file_url);
        assert_eq!(json["fileType"], "pdf");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["submittedBy"]["username"], article.submitter_username);
        assert!(json.get("file_url").is_none());
    }
}
