//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use tunedrop_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tunedrop API",
        version = "0.1.0",
        description = "Upload a track, get back a streaming-friendly transcode, its embedded artwork and its title/artist tags. Generated artifacts are served under /static/processed and can be purged on demand."
    ),
    paths(
        handlers::upload::upload_file,
        handlers::cache::delete_cache,
        handlers::cache::clear_processed_directory,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::Metadata,
            models::UploadResponse,
            models::DeleteCacheResponse,
            models::ClearStoreResponse,
            handlers::cache::DeleteCacheRequest,
            handlers::health::HealthResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "uploads", description = "Upload and transcode media files"),
        (name = "artifacts", description = "Delete generated artifacts"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
