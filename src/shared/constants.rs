/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Public path prefix under which the local upload directory is served
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Extra body allowance for multipart framing and text fields
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;
