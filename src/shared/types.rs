use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Uniform response envelope.
///
/// Pagination fields are only present on list responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    /// Number of items in this page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    /// Total number of matching items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    /// Current page (1-indexed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Total number of pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<i64>,
}

/// Pagination metadata attached to list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Meta {
    pub count: i64,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

impl Meta {
    pub fn new(count: usize, total: i64, pagination: &PaginationQuery) -> Self {
        let limit = pagination.limit();
        Self {
            count: count as i64,
            total,
            page: pagination.page(),
            pages: (total + limit - 1) / limit,
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Standard pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Page number, never below 1
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Calculate SQL OFFSET from page number, saturating for absurd pages
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Get clamped page size (respects MAX_PAGE_SIZE)
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            errors: None,
            count: meta.map(|m| m.count),
            total: meta.map(|m| m.total),
            page: meta.map(|m| m.page),
            pages: meta.map(|m| m.pages),
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            errors,
            count: None,
            total: None,
            page: None,
            pages: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamps() {
        let q = PaginationQuery::new(0, 1000);
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), MAX_PAGE_SIZE);
        assert_eq!(q.offset(), 0);

        let q = PaginationQuery::new(3, 10);
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        let q = PaginationQuery::new(i64::MAX, 10);
        assert_eq!(q.offset(), i64::MAX);
        assert_eq!(PaginationQuery::new(i64::MAX, 1).offset(), i64::MAX - 1);
    }

    #[test]
    fn test_meta_page_count_rounds_up() {
        let q = PaginationQuery::new(1, 10);
        assert_eq!(Meta::new(10, 21, &q).pages, 3);
        assert_eq!(Meta::new(0, 0, &q).pages, 0);
        assert_eq!(Meta::new(10, 20, &q).pages, 2);
    }

    #[test]
    fn test_error_envelope_omits_empty_fields() {
        let body = serde_json::to_value(ApiResponse::<()>::error(
            Some("Article not found".to_string()),
            None,
        ))
        .unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Article not found");
        assert!(body.get("data").is_none());
        assert!(body.get("pages").is_none());
    }
}
