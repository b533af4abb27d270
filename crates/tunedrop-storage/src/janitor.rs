use crate::error::StorageResult;
use crate::store::ArtifactStore;
use std::sync::Arc;

/// Outcome of a batch delete. Every requested name lands in exactly one list,
/// except names that were refused or failed, which are only logged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: Vec<String>,
    pub missing: Vec<String>,
}

/// Removes artifacts on request.
#[derive(Clone)]
pub struct Janitor {
    store: Arc<ArtifactStore>,
}

impl Janitor {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    /// Delete the named artifacts. Never fails as a whole: a name that is
    /// invalid or cannot be removed is logged and skipped.
    pub async fn delete(&self, names: &[String]) -> DeleteReport {
        let mut report = DeleteReport::default();

        for name in names {
            if name.is_empty() {
                continue;
            }

            match self.store.remove(name).await {
                Ok(true) => {
                    tracing::info!(file = %name, "Deleted artifact");
                    report.deleted.push(name.clone());
                }
                Ok(false) => {
                    tracing::warn!(file = %name, "Artifact not found");
                    report.missing.push(name.clone());
                }
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Skipped artifact");
                }
            }
        }

        report
    }

    /// Empty the artifact store, waiting for in-flight uploads first.
    pub async fn wipe(&self) -> StorageResult<()> {
        self.store.wipe().await
    }
}
