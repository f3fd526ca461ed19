use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::articles::dtos::{
    ArticleListQuery, ArticleResponseDto, CreateArticleDto, CreateArticleForm,
    DeleteArticleResponseDto, UpdateArticleStatusDto,
};
use crate::features::articles::services::{ArticleService, ArticleUpload};
use crate::features::auth::guards::RequireReviewer;
use crate::features::auth::model::AuthenticatedUser;
use crate::modules::storage::UploadPolicy;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// State shared by the article handlers
pub struct ArticleState {
    pub service: ArticleService,
    pub upload_policy: UploadPolicy,
}

/// Keep the body-limit rejection as 413, everything else is a malformed request
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    debug!("{}: {}", context, e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Uploaded file exceeds the maximum allowed size".to_string())
    } else {
        AppError::BadRequest(format!("{}: {}", context, e.body_text()))
    }
}

/// Unparsable ids are reported exactly like unknown ones
fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound("Article not found".to_string()))
}

/// List articles
///
/// Plain users only see their own submissions.
#[utoipa::path(
    get,
    path = "/api/articles",
    params(ArticleListQuery),
    responses(
        (status = 200, description = "Articles retrieved successfully", body = ApiResponse<Vec<ArticleResponseDto>>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Authentication required")
    ),
    tag = "articles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_articles(
    user: AuthenticatedUser,
    State(state): State<Arc<ArticleState>>,
    AppQuery(query): AppQuery<ArticleListQuery>,
) -> Result<Json<ApiResponse<Vec<ArticleResponseDto>>>> {
    let pagination = query.pagination();
    let (items, meta) = state
        .service
        .list(&user, query.status, &pagination)
        .await?;

    Ok(Json(ApiResponse::success(Some(items), None, Some(meta))))
}

/// List articles awaiting review
#[utoipa::path(
    get,
    path = "/api/articles/pending",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Pending articles retrieved successfully", body = ApiResponse<Vec<ArticleResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Reviewer role required")
    ),
    tag = "articles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_pending_articles(
    RequireReviewer(_reviewer): RequireReviewer,
    State(state): State<Arc<ArticleState>>,
    AppQuery(pagination): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ArticleResponseDto>>>> {
    let (items, meta) = state.service.list_pending(&pagination).await?;

    Ok(Json(ApiResponse::success(Some(items), None, Some(meta))))
}

/// Get a single article
#[utoipa::path(
    get,
    path = "/api/articles/{id}",
    params(
        ("id" = Uuid, Path, description = "Article ID")
    ),
    responses(
        (status = 200, description = "Article retrieved successfully", body = ApiResponse<ArticleResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Article belongs to another user"),
        (status = 404, description = "Article not found")
    ),
    tag = "articles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_article(
    user: AuthenticatedUser,
    State(state): State<Arc<ArticleState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ArticleResponseDto>>> {
    let id = parse_id(&id)?;
    let article = state.service.get(&user, id).await?;

    Ok(Json(ApiResponse::success(Some(article), None, None)))
}

/// Submit an article
///
/// Accepts multipart/form-data with `title`, `author`, `description` and a
/// `file` (PDF, JPEG or PNG).
#[utoipa::path(
    post,
    path = "/api/articles",
    request_body(
        content = CreateArticleForm,
        content_type = "multipart/form-data",
        description = "Article metadata and the attached file",
    ),
    responses(
        (status = 201, description = "Article submitted successfully", body = ApiResponse<ArticleResponseDto>),
        (status = 400, description = "Validation error, missing, disallowed or oversized file"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "Request body too large")
    ),
    tag = "articles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_article(
    user: AuthenticatedUser,
    State(state): State<Arc<ArticleState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ArticleResponseDto>>)> {
    let mut dto = CreateArticleDto::default();
    let mut file: Option<(Vec<u8>, String, String)> = None;

    // Process multipart fields
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart data", e))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read file data", e))?;

                file = Some((data.to_vec(), file_name, content_type));
            }
            "title" | "author" | "description" => {
                let text = field.text().await.map_err(|e| {
                    multipart_error(&format!("Failed to read {} field", field_name), e)
                })?;
                match field_name.as_str() {
                    "title" => dto.title = text,
                    "author" => dto.author = text,
                    _ => dto.description = text,
                }
            }
            _ => {
                // Ignore unknown fields
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let dto = dto.normalized();
    dto.validate()?;

    let (data, file_name, content_type) =
        file.ok_or_else(|| AppError::BadRequest("Please upload a file".to_string()))?;
    let file_type = state.upload_policy.check(&content_type, data.len())?;

    let article = state
        .service
        .create(
            &user,
            dto,
            ArticleUpload {
                data,
                file_name,
                content_type,
                file_type,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(article),
            Some("Article submitted successfully".to_string()),
            None,
        )),
    ))
}

/// Review an article
#[utoipa::path(
    put,
    path = "/api/articles/{id}",
    params(
        ("id" = Uuid, Path, description = "Article ID")
    ),
    request_body = UpdateArticleStatusDto,
    responses(
        (status = 200, description = "Article updated successfully", body = ApiResponse<ArticleResponseDto>),
        (status = 400, description = "Invalid status"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Reviewer role required"),
        (status = 404, description = "Article not found"),
        (status = 409, description = "Article was already reviewed")
    ),
    tag = "articles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_article_status(
    RequireReviewer(reviewer): RequireReviewer,
    State(state): State<Arc<ArticleState>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateArticleStatusDto>,
) -> Result<Json<ApiResponse<ArticleResponseDto>>> {
    let id = parse_id(&id)?;
    let article = state.service.update_status(&reviewer, id, dto).await?;

    Ok(Json(ApiResponse::success(
        Some(article),
        Some("Article updated successfully".to_string()),
        None,
    )))
}

/// Delete an article and its file
#[utoipa::path(
    delete,
    path = "/api/articles/{id}",
    params(
        ("id" = Uuid, Path, description = "Article ID")
    ),
    responses(
        (status = 200, description = "Article deleted successfully", body = ApiResponse<DeleteArticleResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Article belongs to another user"),
        (status = 404, description = "Article not found")
    ),
    tag = "articles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_article(
    user: AuthenticatedUser,
    State(state): State<Arc<ArticleState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteArticleResponseDto>>> {
    let id = parse_id(&id)?;
    state.service.delete(&user, id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteArticleResponseDto { id, deleted: true }),
        Some("Article deleted successfully".to_string()),
        None,
    )))
}
