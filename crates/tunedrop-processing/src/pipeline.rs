//! Upload pipeline
//!
//! One call to [`UploadPipeline::process`] takes a single upload through
//! naming, staging, probing, artwork extraction and audio transcoding, removes
//! the staged source and assembles the response:
//!
//! ```text
//! Received -> Named -> Probed -> ArtworkAttempted -> AudioTranscoded
//!          -> SourceCleaned -> Responded
//! ```
//!
//! Every tool is invoked exactly once. Metadata and artwork degrade
//! gracefully. The audio artifact does not: when the tool fails or leaves an
//! empty file, the request ends in `Failed` after cleanup has run and the
//! request's partial artifacts have been removed.

use crate::naming::ArtifactNames;
use crate::traits::{MetadataProber, Transcoder};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tunedrop_core::{AppError, PipelineConfig, TranscodeSettings, UploadRequest, UploadResponse};
use tunedrop_storage::{ArtifactStore, StagedUpload, UploadStaging};

/// Lifecycle of a single upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Named,
    Probed,
    ArtworkAttempted,
    AudioTranscoded,
    SourceCleaned,
    Responded,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Named => "named",
            Stage::Probed => "probed",
            Stage::ArtworkAttempted => "artwork_attempted",
            Stage::AudioTranscoded => "audio_transcoded",
            Stage::SourceCleaned => "source_cleaned",
            Stage::Responded => "responded",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enter(stage: Stage) {
    tracing::debug!(stage = %stage, "Pipeline stage");
}

pub struct UploadPipeline {
    prober: Arc<dyn MetadataProber>,
    transcoder: Arc<dyn Transcoder>,
    staging: UploadStaging,
    store: Arc<ArtifactStore>,
    settings: TranscodeSettings,
    quarantine_dir: Option<PathBuf>,
}

impl UploadPipeline {
    pub fn new(
        prober: Arc<dyn MetadataProber>,
        transcoder: Arc<dyn Transcoder>,
        staging: UploadStaging,
        store: Arc<ArtifactStore>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            prober,
            transcoder,
            staging,
            store,
            settings: config.transcode.clone(),
            quarantine_dir: config.quarantine_dir.clone(),
        }
    }

    pub fn store(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    pub fn staging(&self) -> &UploadStaging {
        &self.staging
    }

    #[tracing::instrument(
        skip(self, request),
        fields(filename = %request.filename, size = request.data.len(), request_id = tracing::field::Empty)
    )]
    pub async fn process(&self, request: UploadRequest) -> Result<UploadResponse, AppError> {
        let start = Instant::now();
        enter(Stage::Received);

        if request.filename.trim().is_empty() {
            enter(Stage::Failed);
            return Err(AppError::InvalidInput("No selected file".to_string()));
        }

        let names = ArtifactNames::generate(&self.settings);
        tracing::Span::current().record("request_id", names.request_id.as_str());
        let audio_path = self.store.path_for(&names.audio).map_err(|e| {
            AppError::Internal(format!("Invalid audio artifact name {}: {}", names.audio, e))
        })?;
        let artwork_path = self.store.path_for(&names.artwork).map_err(|e| {
            AppError::Internal(format!(
                "Invalid artwork artifact name {}: {}",
                names.artwork, e
            ))
        })?;
        enter(Stage::Named);

        let staged = self
            .staging
            .stage(&names.request_id, &request.filename, &request.data)
            .await
            .map_err(|e| AppError::InternalWithSource {
                message: "Failed to stage upload".to_string(),
                source: e.into(),
            })?;
        drop(request);
        let original_filename = staged.original_filename.clone();

        let metadata = self.prober.probe_or_unknown(&staged.path).await;
        enter(Stage::Probed);

        // Held until the response is assembled so a wipe cannot remove the
        // artifacts in between.
        let lease = self.store.lease().await;

        self.transcoder
            .extract_artwork(&staged.path, &artwork_path)
            .await;
        enter(Stage::ArtworkAttempted);

        let audio_ok = self
            .transcoder
            .transcode_audio(&staged.path, &audio_path, &self.settings)
            .await;
        let audio_present = audio_ok && self.store.has_content(&names.audio).await;
        enter(Stage::AudioTranscoded);

        self.cleanup_source(staged, audio_present).await;
        enter(Stage::SourceCleaned);

        if !audio_present {
            self.remove_partial(&names.audio).await;
            self.remove_partial(&names.artwork).await;
            enter(Stage::Failed);
            tracing::error!(
                tool_succeeded = audio_ok,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Audio transcoding produced no output"
            );
            return Err(AppError::MediaConversionError(format!(
                "No audio produced for {}",
                original_filename
            )));
        }

        let artwork_filename = if self.store.has_content(&names.artwork).await {
            Some(names.artwork.clone())
        } else {
            // ffmpeg may leave an empty file behind when there is no picture
            self.remove_partial(&names.artwork).await;
            None
        };

        let response = UploadResponse {
            audio_url: self.store.url_for(&names.audio),
            artwork_url: artwork_filename.as_deref().map(|name| self.store.url_for(name)),
            metadata,
            processed_filename: names.audio,
            artwork_filename,
        };
        drop(lease);
        enter(Stage::Responded);

        tracing::info!(
            has_artwork = response.artwork_filename.is_some(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload processed"
        );

        Ok(response)
    }

    /// The staged source never outlives its request. On failure it is kept in
    /// the quarantine directory when one is configured; if that fails too the
    /// guard in [`StagedUpload`] still deletes it.
    async fn cleanup_source(&self, staged: StagedUpload, audio_present: bool) {
        let path = staged.path.clone();
        let result = match (&self.quarantine_dir, audio_present) {
            (Some(dir), false) => self.staging.quarantine(staged, dir).await.map(|_| ()),
            _ => self.staging.discard(staged).await,
        };

        if let Err(e) = result {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to clean up staged upload"
            );
        }
    }

    async fn remove_partial(&self, name: &str) {
        if let Err(e) = self.store.remove(name).await {
            tracing::warn!(file = %name, error = %e, "Failed to remove partial artifact");
        }
    }
}
