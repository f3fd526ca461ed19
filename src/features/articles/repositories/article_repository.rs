use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::articles::models::{Article, ArticleFilter, ArticleStatus, NewArticle};

/// Persistence for article records
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Newest first. Returns the page and the total number of matches.
    async fn list(
        &self,
        filter: ArticleFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Article>, i64)>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>>;

    async fn create(&self, article: NewArticle) -> Result<Article>;

    /// Set the status, replacing feedback only when `feedback` is given
    async fn update_status(
        &self,
        id: Uuid,
        status: ArticleStatus,
        feedback: Option<&str>,
    ) -> Result<Option<Article>>;

    /// Returns whether a record was removed
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct PgArticleRepository {
    pool: PgPool,
}

impl PgArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(action: &str, e: sqlx::Error) -> AppError {
    tracing::error!("Failed to {}: {:?}", action, e);
    AppError::Database(e)
}

#[async_trait]
impl ArticleRepository for PgArticleRepository {
    async fn list(
        &self,
        filter: ArticleFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Article>, i64)> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT a.id, a.title, a.author, a.description, a.status, a.file_url, a.file_type,
                   a.submitted_by, u.username AS submitter_username, u.email AS submitter_email,
                   a.feedback, a.created_at, a.updated_at
            FROM articles a
            JOIN users u ON u.id = a.submitted_by
            WHERE ($1::article_status IS NULL OR a.status = $1)
              AND ($2::uuid IS NULL OR a.submitted_by = $2)
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.status)
        .bind(filter.submitted_by)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list articles", e))?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM articles a
            WHERE ($1::article_status IS NULL OR a.status = $1)
              AND ($2::uuid IS NULL OR a.submitted_by = $2)
            "#,
        )
        .bind(filter.status)
        .bind(filter.submitted_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count articles", e))?;

        Ok((articles, total))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>> {
        sqlx::query_as::<_, Article>(
            r#"
            SELECT a.id, a.title, a.author, a.description, a.status, a.file_url, a.file_type,
                   a.submitted_by, u.username AS submitter_username, u.email AS submitter_email,
                   a.feedback, a.created_at, a.updated_at
            FROM articles a
            JOIN users u ON u.id = a.submitted_by
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("get article by id", e))
    }

    async fn create(&self, article: NewArticle) -> Result<Article> {
        sqlx::query_as::<_, Article>(
            r#"
            WITH inserted AS (
                INSERT INTO articles (title, author, description, file_url, file_type, submitted_by)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT a.id, a.title, a.author, a.description, a.status, a.file_url, a.file_type,
                   a.submitted_by, u.username AS submitter_username, u.email AS submitter_email,
                   a.feedback, a.created_at, a.updated_at
            FROM inserted a
            JOIN users u ON u.id = a.submitted_by
            "#,
        )
        .bind(&article.title)
        .bind(&article.author)
        .bind(&article.description)
        .bind(&article.file_url)
        .bind(article.file_type)
        .bind(article.submitted_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("create article", e))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ArticleStatus,
        feedback: Option<&str>,
    ) -> Result<Option<Article>> {
        sqlx::query_as::<_, Article>(
            r#"
            WITH updated AS (
                UPDATE articles
                SET status = $2,
                    feedback = COALESCE($3, feedback),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT a.id, a.title, a.author, a.description, a.status, a.file_url, a.file_type,
                   a.submitted_by, u.username AS submitter_username, u.email AS submitter_email,
                   a.feedback, a.created_at, a.updated_at
            FROM updated a
            JOIN users u ON u.id = a.submitted_by
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(feedback)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("update article status", e))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete article", e))?;

        Ok(result.rows_affected() > 0)
    }
}
