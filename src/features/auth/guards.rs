//! Role-based authorization guards.
//!
//! Authentication always runs first (see `core::middleware::auth_middleware`),
//! which places an `AuthenticatedUser` in the request extensions. Guards then
//! compare the user's role with a fixed allow-set.
//!
//! Roles:
//! - admin: full review rights
//! - editor: full review rights
//! - user: may only submit and manage their own articles

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::Role;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Roles allowed to review articles
pub const REVIEWER_ROLES: &[Role] = &[Role::Editor, Role::Admin];

/// Check the user's role against an allow-set
pub fn authorize(user: &AuthenticatedUser, allowed: &[Role]) -> Result<()> {
    if user.has_any_role(allowed) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "User role {} is not authorized to access this route",
            user.role
        )))
    }
}

/// Guard for review operations.
///
/// Allows users with the "editor" or "admin" role.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireReviewer(user): RequireReviewer) { ... }
/// ```
pub struct RequireReviewer(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireReviewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        authorize(user, REVIEWER_ROLES)?;

        Ok(RequireReviewer(user.clone()))
    }
}
