//! Application state shared by all handlers.

use std::sync::Arc;
use tunedrop_processing::UploadPipeline;
use tunedrop_storage::Janitor;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<UploadPipeline>,
    pub janitor: Janitor,
}
