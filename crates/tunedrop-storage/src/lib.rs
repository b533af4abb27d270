//! Tunedrop Storage Library
//!
//! Filesystem layout owned by the upload pipeline:
//!
//! - the **staging area** holds source uploads for the lifetime of one request,
//!   named `{request_id}_{sanitised original filename}`;
//! - the **artifact store** holds generated artifacts (`processed_{id}.{ext}`,
//!   `art_{id}.{ext}`) until the janitor removes them or the store is wiped.
//!
//! Artifact names are flat: they must not contain separators or `..`. Name
//! validation lives in the `keys` module so every entry point applies the same
//! rules.

pub mod error;
pub mod janitor;
pub(crate) mod keys;
pub mod staging;
pub mod store;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use janitor::{DeleteReport, Janitor};
pub use staging::{StagedUpload, UploadStaging};
pub use store::{ArtifactStore, StoreLease};
