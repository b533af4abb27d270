use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;
use tunedrop_core::constants::UPLOAD_FIELD_NAME;
use tunedrop_core::{AppError, UploadRequest, UploadResponse};

/// Upload a media file and get back its transcoded audio, artwork and tags.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Form with a `file` part"),
    responses(
        (status = 200, description = "Upload processed", body = UploadResponse),
        (status = 400, description = "No file part or empty filename", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Audio could not be transcoded", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let mut request = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        request = Some(UploadRequest::new(filename, data));
        break;
    }

    let request =
        request.ok_or_else(|| AppError::InvalidInput("No file part".to_string()))?;

    let response = state.pipeline.process(request).await?;
    Ok(Json(response))
}
