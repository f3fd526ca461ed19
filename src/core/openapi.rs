use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::articles::{dtos as articles_dtos, handlers as articles_handlers, models};
use crate::features::auth;
use crate::features::health::handlers as health_handlers;
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health_handlers::health_check,
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::get_me,
        // Articles
        articles_handlers::list_articles,
        articles_handlers::list_pending_articles,
        articles_handlers::get_article,
        articles_handlers::create_article,
        articles_handlers::update_article_status,
        articles_handlers::delete_article,
    ),
    components(
        schemas(
            // Health
            health_handlers::HealthResponseDto,
            ApiResponse<health_handlers::HealthResponseDto>,
            // Auth
            auth::dtos::RegisterRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::AuthResponseDto,
            auth::dtos::UserResponseDto,
            ApiResponse<auth::dtos::AuthResponseDto>,
            ApiResponse<auth::dtos::UserResponseDto>,
            // Articles
            models::ArticleStatus,
            models::FileType,
            articles_dtos::CreateArticleForm,
            articles_dtos::UpdateArticleStatusDto,
            articles_dtos::SubmitterDto,
            articles_dtos::ArticleResponseDto,
            articles_dtos::DeleteArticleResponseDto,
            ApiResponse<articles_dtos::ArticleResponseDto>,
            ApiResponse<Vec<articles_dtos::ArticleResponseDto>>,
            ApiResponse<articles_dtos::DeleteArticleResponseDto>,
        )
    ),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "auth", description = "Registration, login and current user"),
        (name = "articles", description = "Article submission and review"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Article Review API",
        version = "0.1.0",
        description = "API documentation for the article submission and review service",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/health",
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/me",
            "/api/articles",
            "/api/articles/pending",
            "/api/articles/{id}",
        ] {
            assert!(paths.contains(&expected), "missing {}", expected);
        }

        let schemes = doc.components.unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
