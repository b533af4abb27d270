use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Metadata;

/// A file received from a client, alive for the duration of one request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Filename as sent by the client, unsanitised
    pub filename: String,
    pub data: Bytes,
}

impl UploadRequest {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Result of a successful upload.
///
/// `artwork_url` and `artwork_filename` are `null` when the source carried no
/// embedded picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub audio_url: String,
    pub artwork_url: Option<String>,
    pub metadata: Metadata,
    pub processed_filename: String,
    pub artwork_filename: Option<String>,
}
