use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::health::handlers::health_check;

/// Health check routes (no auth required)
pub fn routes(environment: String) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/health", get(health_check))
        .with_state(Arc::new(environment))
}
