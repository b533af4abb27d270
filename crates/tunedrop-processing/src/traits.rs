//! Capability interfaces of the external media tools
//!
//! The pipeline only talks to these traits, so tests can swap in fakes that
//! never spawn a process.

use async_trait::async_trait;
use std::path::Path;
use tunedrop_core::{Metadata, TranscodeSettings};

/// Read-only inspection of a media file.
#[async_trait]
pub trait MetadataProber: Send + Sync {
    /// Extract title and artist. Missing tags are filled with the sentinel
    /// values; an error means the file could not be inspected at all.
    async fn probe(&self, path: &Path) -> Result<Metadata, anyhow::Error>;

    /// Like [`probe`](MetadataProber::probe), but a failure is logged and
    /// replaced by [`Metadata::unknown`].
    async fn probe_or_unknown(&self, path: &Path) -> Metadata {
        match self.probe(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Metadata probe failed, using defaults"
                );
                Metadata::unknown()
            }
        }
    }
}

/// Stream copy and transcode operations of the processing tool.
///
/// Both methods return whether the tool reported success. Callers decide about
/// artifacts by inspecting the target files; an embedded picture that does not
/// exist makes `extract_artwork` fail without being an error.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Copy the embedded picture stream of `source` to `target`.
    async fn extract_artwork(&self, source: &Path, target: &Path) -> bool;

    /// Re-encode the audio stream of `source` into `target`.
    async fn transcode_audio(
        &self,
        source: &Path,
        target: &Path,
        settings: &TranscodeSettings,
    ) -> bool;
}
