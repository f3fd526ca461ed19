use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;

use crate::features::articles::handlers::{
    create_article, delete_article, get_article, list_articles, list_pending_articles,
    update_article_status, ArticleState,
};
use crate::shared::constants::MULTIPART_OVERHEAD;

/// Article routes. All of them require bearer authentication.
pub fn routes(state: Arc<ArticleState>) -> Router {
    let body_limit = state.upload_policy.max_file_size() + MULTIPART_OVERHEAD;

    Router::new()
        .route(
            "/api/articles",
            get(list_articles)
                // Allow body size up to the file limit plus multipart framing
                .post(create_article)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/articles/pending", get(list_pending_articles))
        .route(
            "/api/articles/{id}",
            get(get_article)
                .put(update_article_status)
                .delete(delete_article),
        )
        .with_state(state)
}
