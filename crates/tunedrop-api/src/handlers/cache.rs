use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;
use tunedrop_core::{AppError, ClearStoreResponse, DeleteCacheResponse};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteCacheRequest {
    /// Artifact filenames previously returned by `/upload`
    #[serde(default, deserialize_with = "present_value")]
    #[schema(value_type = Vec<String>)]
    pub files: Option<Value>,
}

/// `None` only when the key is absent; an explicit `null` stays `Some(Null)`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Pull the filenames out of the `files` value. Empty strings and non-string
/// entries are skipped.
fn requested_names(files: Option<Value>) -> Result<Vec<String>, AppError> {
    let items = match files {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(AppError::InvalidInput(
                "Invalid data format, 'files' must be a list.".to_string(),
            ))
        }
    };

    let mut names = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(name) if name.is_empty() => {}
            Value::String(name) => names.push(name),
            other => {
                tracing::warn!(entry = %other, "Ignoring non-string entry in delete list");
            }
        }
    }
    Ok(names)
}

/// Delete artifacts by filename. Missing files are reported, never an error.
#[utoipa::path(
    post,
    path = "/delete_cache",
    tag = "artifacts",
    request_body = DeleteCacheRequest,
    responses(
        (status = 200, description = "Delete attempted", body = DeleteCacheResponse),
        (status = 400, description = "Body is not JSON or 'files' is not a list", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body), fields(operation = "delete_cache"))]
pub async fn delete_cache(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<DeleteCacheRequest>,
) -> Result<Json<DeleteCacheResponse>, HttpAppError> {
    let names = requested_names(body.files)?;
    let report = state.janitor.delete(&names).await;

    tracing::info!(
        requested = names.len(),
        deleted = report.deleted.len(),
        missing = report.missing.len(),
        "Artifact delete finished"
    );

    Ok(Json(DeleteCacheResponse::new(report.deleted, report.missing)))
}

/// Remove every artifact. Waits for uploads in progress to finish first.
#[utoipa::path(
    post,
    path = "/clear_processed_directory",
    tag = "artifacts",
    responses(
        (status = 200, description = "Artifact store emptied", body = ClearStoreResponse),
        (status = 500, description = "Directory could not be removed or recreated", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "clear_processed_directory"))]
pub async fn clear_processed_directory(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearStoreResponse>, HttpAppError> {
    state.janitor.wipe().await?;
    Ok(Json(ClearStoreResponse::cleared()))
}
