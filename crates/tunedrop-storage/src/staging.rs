use crate::error::{StorageError, StorageResult};
use crate::keys::sanitize_upload_filename;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Directory where source uploads live while their request is processed.
#[derive(Debug, Clone)]
pub struct UploadStaging {
    base_path: PathBuf,
}

/// A source upload written to the staging area.
///
/// The file is deleted when the value is dropped unless it was handed to
/// [`UploadStaging::discard`] or [`UploadStaging::quarantine`] first, so an
/// abandoned request never leaves its source behind.
#[derive(Debug)]
pub struct StagedUpload {
    pub path: PathBuf,
    pub original_filename: String,
    armed: bool,
}

impl StagedUpload {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::warn!(path = %self.path.display(), "Abandoned staged upload removed");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove abandoned staged upload"
                );
            }
        }
    }
}

impl UploadStaging {
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create upload directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(UploadStaging { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write the upload bytes to `{request_id}_{sanitised name}`.
    pub async fn stage(
        &self,
        request_id: &str,
        original_filename: &str,
        data: &[u8],
    ) -> StorageResult<StagedUpload> {
        let start = std::time::Instant::now();
        let name = format!("{}_{}", request_id, sanitize_upload_filename(original_filename));
        let path = self.base_path.join(&name);

        let file = fs::File::create(&path)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("Failed to create {}: {}", name, e)))?;

        // From here on the guard owns the file, so a failed write removes it
        let staged = StagedUpload {
            path,
            original_filename: original_filename.to_string(),
            armed: true,
        };
        write_contents(file, data)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("Failed to write {}: {}", name, e)))?;

        tracing::info!(
            path = %staged.path.display(),
            size = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload staged"
        );

        Ok(staged)
    }

    /// Delete a staged source. An already missing file is not an error.
    pub async fn discard(&self, mut staged: StagedUpload) -> StorageResult<()> {
        match fs::remove_file(&staged.path).await {
            Ok(()) => {
                staged.disarm();
                tracing::debug!(path = %staged.path.display(), "Staged upload removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                staged.disarm();
                Ok(())
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete {}: {}",
                staged.path.display(),
                e
            ))),
        }
    }

    /// Move a staged source into `quarantine_dir` for later inspection.
    ///
    /// Falls back to copy and delete when the directories are on different
    /// filesystems. On error the staged file is still removed.
    pub async fn quarantine(
        &self,
        mut staged: StagedUpload,
        quarantine_dir: &Path,
    ) -> StorageResult<PathBuf> {
        fs::create_dir_all(quarantine_dir).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create quarantine directory {}: {}",
                quarantine_dir.display(),
                e
            ))
        })?;

        let file_name = staged
            .path
            .file_name()
            .ok_or_else(|| StorageError::InvalidName(staged.path.display().to_string()))?;
        let target = quarantine_dir.join(file_name);

        let source = staged.path.clone();
        if fs::rename(&source, &target).await.is_ok() {
            staged.disarm();
        } else {
            fs::copy(&source, &target).await.map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to move {} to quarantine: {}",
                    source.display(),
                    e
                ))
            })?;
            self.discard(staged).await?;
        }

        tracing::warn!(
            source = %source.display(),
            target = %target.display(),
            "Upload moved to quarantine"
        );

        Ok(target)
    }
}

async fn write_contents(mut file: fs::File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data).await?;
    file.sync_all().await
}
