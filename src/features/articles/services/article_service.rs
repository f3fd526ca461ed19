use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::articles::dtos::{
    ArticleResponseDto, CreateArticleDto, UpdateArticleStatusDto,
};
use crate::features::articles::models::{
    Article, ArticleFilter, ArticleStatus, FileType, NewArticle,
};
use crate::features::articles::policy::{ArticleScope, StatusPolicy};
use crate::features::articles::repositories::ArticleRepository;
use crate::features::auth::model::AuthenticatedUser;
use crate::modules::storage::FallbackStorage;
use crate::shared::types::{Meta, PaginationQuery};

/// An uploaded file that already passed the upload policy
#[derive(Debug, Clone)]
pub struct ArticleUpload {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
    pub file_type: FileType,
}

/// Submission and review workflow for articles
pub struct ArticleService {
    articles: Arc<dyn ArticleRepository>,
    storage: Arc<FallbackStorage>,
    status_policy: StatusPolicy,
}

impl ArticleService {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        storage: Arc<FallbackStorage>,
        status_policy: StatusPolicy,
    ) -> Self {
        Self {
            articles,
            storage,
            status_policy,
        }
    }

    /// List articles visible to `user`.
    ///
    /// Plain users only ever see their own submissions, whatever the filter.
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        status: Option<ArticleStatus>,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ArticleResponseDto>, Meta)> {
        let filter = ArticleFilter {
            status,
            submitted_by: ArticleScope::for_user(user).owner_filter(),
        };
        self.page(filter, pagination).await
    }

    /// Review queue. Callers must already be authorized as reviewers.
    pub async fn list_pending(
        &self,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ArticleResponseDto>, Meta)> {
        let filter = ArticleFilter {
            status: Some(ArticleStatus::Pending),
            submitted_by: None,
        };
        self.page(filter, pagination).await
    }

    async fn page(
        &self,
        filter: ArticleFilter,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ArticleResponseDto>, Meta)> {
        let (articles, total) = self
            .articles
            .list(filter, pagination.offset(), pagination.limit())
            .await?;

        let meta = Meta::new(articles.len(), total, pagination);
        let items = articles.into_iter().map(ArticleResponseDto::from).collect();
        Ok((items, meta))
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> Result<ArticleResponseDto> {
        let article = self.find_visible(user, id).await?;
        Ok(article.into())
    }

    /// Store the file, then record the article as pending.
    ///
    /// Expects an already validated DTO. The stored file is removed again if
    /// the record cannot be written.
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateArticleDto,
        upload: ArticleUpload,
    ) -> Result<ArticleResponseDto> {
        let stored = self
            .storage
            .store(&upload.data, &upload.file_name, &upload.content_type)
            .await?;

        let new_article = NewArticle {
            title: dto.title,
            author: dto.author,
            description: dto.description,
            file_url: stored.url.clone(),
            file_type: upload.file_type,
            submitted_by: user.id,
        };

        match self.articles.create(new_article).await {
            Ok(article) => {
                tracing::info!(
                    "Article submitted: id={}, user={}, backend={}",
                    article.id,
                    user.id,
                    stored.backend
                );
                Ok(article.into())
            }
            Err(e) => {
                tracing::warn!(
                    "Removing stored file {} after failed submission: {}",
                    stored.url,
                    e
                );
                self.storage.delete(&stored.url).await;
                Err(e)
            }
        }
    }

    /// Record a review decision.
    ///
    /// Feedback is only replaced when a non-empty value is given.
    pub async fn update_status(
        &self,
        reviewer: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateArticleStatusDto,
    ) -> Result<ArticleResponseDto> {
        let current = self
            .articles
            .find_by_id(id)
            .await?
            .ok_or_else(not_found)?;

        self.status_policy.check(current.status)?;

        let updated = self
            .articles
            .update_status(id, dto.status, dto.feedback())
            .await?
            .ok_or_else(not_found)?;

        tracing::info!(
            "Article {} marked {} by {} (was {})",
            id,
            updated.status,
            reviewer.username,
            current.status
        );

        Ok(updated.into())
    }

    /// Delete an article and, best effort, its stored file
    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let article = self.find_visible(user, id).await?;

        if !self.storage.delete(&article.file_url).await {
            tracing::warn!(
                "File {} for article {} could not be removed",
                article.file_url,
                id
            );
        }

        if !self.articles.delete(id).await? {
            return Err(not_found());
        }

        tracing::info!("Article {} deleted by {}", id, user.id);
        Ok(())
    }

    async fn find_visible(&self, user: &AuthenticatedUser, id: Uuid) -> Result<Article> {
        let article = self
            .articles
            .find_by_id(id)
            .await?
            .ok_or_else(not_found)?;

        if !ArticleScope::for_user(user).permits(&article) {
            return Err(AppError::Forbidden(
                "Not authorized to access this article".to_string(),
            ));
        }

        Ok(article)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Article not found".to_string())
}
