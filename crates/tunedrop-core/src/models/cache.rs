use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const STATUS_SUCCESS: &str = "success";

/// Outcome of a selective artifact delete. `status` is always `"success"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteCacheResponse {
    pub status: String,
    /// Names that were removed by this call
    pub deleted: Vec<String>,
    /// Names that were not present (or could not be removed)
    pub missing: Vec<String>,
}

impl DeleteCacheResponse {
    pub fn new(deleted: Vec<String>, missing: Vec<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            deleted,
            missing,
        }
    }
}

/// Outcome of a full artifact store wipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClearStoreResponse {
    pub status: String,
    pub message: String,
}

impl ClearStoreResponse {
    pub fn cleared() -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: "Processed directory cleared.".to_string(),
        }
    }
}
