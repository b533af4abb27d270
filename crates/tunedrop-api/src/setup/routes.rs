//! Route configuration and setup.

use crate::api_doc::ApiDoc;
use crate::constants::{
    CLEAR_PROCESSED_PATH, DELETE_CACHE_PATH, DOCS_PATH, HEALTH_PATH, OPENAPI_PATH, UPLOAD_PATH,
};
use crate::handlers;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, Request},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tunedrop_core::Config;
use tunedrop_infra::{request_id_middleware, RequestId};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    let max_concurrent_transcodes = config.max_concurrent_transcodes();
    tracing::info!(
        max_concurrent_transcodes,
        max_upload_mb = config.max_upload_size_bytes() / 1024 / 1024,
        "Upload limits enabled"
    );

    let app = Router::new()
        .route(
            UPLOAD_PATH,
            post(handlers::upload::upload_file)
                .layer(ConcurrencyLimitLayer::new(max_concurrent_transcodes)),
        )
        .route(DELETE_CACHE_PATH, post(handlers::cache::delete_cache))
        .route(
            CLEAR_PROCESSED_PATH,
            post(handlers::cache::clear_processed_directory),
        )
        .route(HEALTH_PATH, get(handlers::health::health_check))
        .merge(RapiDoc::with_openapi(OPENAPI_PATH, ApiDoc::openapi()).path(DOCS_PATH))
        .nest_service(
            config.artifact_url_prefix(),
            ServeDir::new(&config.pipeline.artifact_dir),
        )
        .layer(RequestBodyLimitLayer::new(config.max_upload_size_bytes()))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(trace_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
