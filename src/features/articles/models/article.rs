use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

pub use crate::modules::storage::FileType;

/// Review status enum matching database enum
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "article_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Pending => "pending",
            ArticleStatus::Approved => "approved",
            ArticleStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ArticleStatus::Pending),
            "approved" => Ok(ArticleStatus::Approved),
            "rejected" => Ok(ArticleStatus::Rejected),
            other => Err(format!("Unknown article status '{}'", other)),
        }
    }
}

/// Database model for article, with the submitter's identity joined in
#[derive(Debug, Clone, FromRow)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub description: String,
    pub status: ArticleStatus,
    pub file_url: String,
    pub file_type: FileType,
    pub submitted_by: Uuid,
    pub submitter_username: String,
    pub submitter_email: String,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert an article. Status always starts as pending.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub author: String,
    pub description: String,
    pub file_url: String,
    pub file_type: FileType,
    pub submitted_by: Uuid,
}

/// Filter applied to article listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub status: Option<ArticleStatus>,
    pub submitted_by: Option<Uuid>,
}

impl ArticleFilter {
    pub fn matches(&self, article: &Article) -> bool {
        self.status.is_none_or(|s| s == article.status)
            && self.submitted_by.is_none_or(|id| id == article.submitted_by)
    }
}
