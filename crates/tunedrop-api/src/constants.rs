//! Route paths

pub const UPLOAD_PATH: &str = "/upload";
pub const DELETE_CACHE_PATH: &str = "/delete_cache";
pub const CLEAR_PROCESSED_PATH: &str = "/clear_processed_directory";
pub const HEALTH_PATH: &str = "/health";
pub const OPENAPI_PATH: &str = "/api/openapi.json";
pub const DOCS_PATH: &str = "/docs";
