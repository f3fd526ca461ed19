use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::shared::types::ApiResponse;

/// Liveness payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponseDto {
    pub status: String,
    pub message: String,
    pub environment: String,
}

/// Report that the server is up
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Server is running", body = ApiResponse<HealthResponseDto>)
    ),
    tag = "health"
)]
pub async fn health_check(
    State(environment): State<Arc<String>>,
) -> Json<ApiResponse<HealthResponseDto>> {
    Json(ApiResponse::success(
        Some(HealthResponseDto {
            status: "OK".to_string(),
            message: "Server is running".to_string(),
            environment: environment.to_string(),
        }),
        None,
        None,
    ))
}
