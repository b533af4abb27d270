use crate::error::{StorageError, StorageResult};
use crate::keys::validate_artifact_name;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{OwnedRwLockReadGuard, RwLock};

/// Directory holding every generated artifact, shared by all requests.
///
/// Concurrent pipelines write disjoint names and need no coordination between
/// themselves. A full wipe does: pipelines hold a [`StoreLease`] (shared side
/// of the gate) while they produce and check their artifacts, and [`wipe`]
/// takes the exclusive side, so it waits for in-flight pipelines to finish.
///
/// [`wipe`]: ArtifactStore::wipe
#[derive(Clone)]
pub struct ArtifactStore {
    base_path: PathBuf,
    url_prefix: String,
    gate: Arc<RwLock<()>>,
}

/// Shared hold on the artifact store; a wipe cannot start while one is alive.
pub struct StoreLease {
    _guard: OwnedRwLockReadGuard<()>,
}

impl ArtifactStore {
    /// Create the store, creating `base_path` if needed.
    ///
    /// # Arguments
    /// * `base_path` - Directory holding the artifacts (e.g. "static/processed")
    /// * `url_prefix` - URL path the directory is served under (e.g. "/static/processed")
    pub async fn new(base_path: impl Into<PathBuf>, url_prefix: impl Into<String>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create artifact directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(ArtifactStore {
            base_path,
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
            gate: Arc::new(RwLock::new(())),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Filesystem path of an artifact. Only flat names are accepted.
    pub fn path_for(&self, name: &str) -> StorageResult<PathBuf> {
        validate_artifact_name(name)?;
        Ok(self.base_path.join(name))
    }

    /// Public URL of an artifact
    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.url_prefix, name)
    }

    /// Take the shared side of the wipe gate.
    pub async fn lease(&self) -> StoreLease {
        StoreLease {
            _guard: self.gate.clone().read_owned().await,
        }
    }

    /// True when the artifact exists and is non-empty.
    pub async fn has_content(&self, name: &str) -> bool {
        let Ok(path) = self.path_for(name) else {
            return false;
        };
        match fs::metadata(&path).await {
            Ok(meta) => meta.is_file() && meta.len() > 0,
            Err(_) => false,
        }
    }

    /// Remove one artifact. Returns `false` when it was already absent.
    pub async fn remove(&self, name: &str) -> StorageResult<bool> {
        let path = self.path_for(name)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Artifact removed");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Names of all artifacts currently in the store, sorted.
    pub async fn list(&self) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();

        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Remove the whole store directory and recreate it empty.
    ///
    /// Waits for every outstanding [`StoreLease`]. Succeeds when the directory
    /// does not exist yet.
    pub async fn wipe(&self) -> StorageResult<()> {
        let _exclusive = self.gate.write().await;
        let start = std::time::Instant::now();

        match fs::remove_dir_all(&self.base_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StorageError::WipeFailed(format!(
                    "Failed to remove {}: {}",
                    self.base_path.display(),
                    e
                )))
            }
        }

        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            StorageError::WipeFailed(format!(
                "Failed to recreate {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %self.base_path.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Artifact store wiped"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    async fn test_store(dir: &Path) -> ArtifactStore {
        ArtifactStore::new(dir.join("processed"), "/static/processed/")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_new_creates_directory() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;
        assert!(store.base_path().is_dir());
    }

    #[tokio::test]
    async fn test_url_for_trims_trailing_slash() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;
        assert_eq!(
            store.url_for("processed_abc.opus"),
            "/static/processed/processed_abc.opus"
        );
    }

    #[tokio::test]
    async fn test_path_for_rejects_traversal() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;

        assert!(matches!(
            store.path_for("../uploads/song.mp3"),
            Err(StorageError::InvalidName(_))
        ));
        assert!(store.path_for("art_abc.jpg").is_ok());
    }

    #[tokio::test]
    async fn test_has_content_requires_non_empty_file() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;

        assert!(!store.has_content("art_missing.jpg").await);

        std::fs::write(store.path_for("art_empty.jpg").unwrap(), b"").unwrap();
        assert!(!store.has_content("art_empty.jpg").await);

        std::fs::write(store.path_for("art_full.jpg").unwrap(), b"\xff\xd8").unwrap();
        assert!(store.has_content("art_full.jpg").await);
    }

    #[tokio::test]
    async fn test_remove_reports_absence() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;

        std::fs::write(store.path_for("processed_a.opus").unwrap(), b"x").unwrap();
        assert!(store.remove("processed_a.opus").await.unwrap());
        assert!(!store.remove("processed_a.opus").await.unwrap());
    }

    #[tokio::test]
    async fn test_wipe_empties_store() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;

        std::fs::write(store.path_for("processed_a.opus").unwrap(), b"x").unwrap();
        std::fs::write(store.path_for("art_a.jpg").unwrap(), b"x").unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);

        store.wipe().await.unwrap();

        assert!(store.base_path().is_dir());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wipe_recreates_missing_directory() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;

        std::fs::remove_dir_all(store.base_path()).unwrap();
        assert!(store.list().await.unwrap().is_empty());

        store.wipe().await.unwrap();
        assert!(store.base_path().is_dir());
    }

    #[tokio::test]
    async fn test_wipe_waits_for_lease() {
        let dir = tempdir().unwrap();
        let store = test_store(dir.path()).await;

        let lease = store.lease().await;
        let wiping = {
            let store = store.clone();
            tokio::spawn(async move { store.wipe().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!wiping.is_finished());

        std::fs::write(store.path_for("processed_a.opus").unwrap(), b"x").unwrap();
        drop(lease);

        wiping.await.unwrap().unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
