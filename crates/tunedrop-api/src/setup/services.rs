//! Service construction

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tunedrop_core::Config;
use tunedrop_processing::{
    FfmpegTranscoder, FfprobeProber, MetadataProber, ToolRunner, Transcoder, UploadPipeline,
};
use tunedrop_storage::{ArtifactStore, Janitor, UploadStaging};

/// Build the application state backed by the configured ffprobe and ffmpeg.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let pipeline_config = &config.pipeline;

    let prober = FfprobeProber::new(ToolRunner::new(
        pipeline_config.ffprobe_path.clone(),
        pipeline_config.tool_timeout,
    ));
    let transcoder = FfmpegTranscoder::new(ToolRunner::new(
        pipeline_config.ffmpeg_path.clone(),
        pipeline_config.tool_timeout,
    ));

    tracing::info!(
        ffprobe_path = %pipeline_config.ffprobe_path,
        ffmpeg_path = %pipeline_config.ffmpeg_path,
        audio_codec = %pipeline_config.transcode.audio_codec,
        audio_bitrate_kbps = pipeline_config.transcode.audio_bitrate_kbps,
        audio_channels = pipeline_config.transcode.audio_channels,
        tool_timeout_secs = pipeline_config.tool_timeout.as_secs(),
        "Media tools configured"
    );

    build_state(config, Arc::new(prober), Arc::new(transcoder)).await
}

/// Build the application state around the given tool implementations.
pub async fn build_state(
    config: &Config,
    prober: Arc<dyn MetadataProber>,
    transcoder: Arc<dyn Transcoder>,
) -> Result<Arc<AppState>> {
    let pipeline_config = &config.pipeline;

    let staging = UploadStaging::new(&pipeline_config.upload_dir)
        .await
        .context("Failed to prepare upload directory")?;
    let store = Arc::new(
        ArtifactStore::new(
            &pipeline_config.artifact_dir,
            &pipeline_config.artifact_url_prefix,
        )
        .await
        .context("Failed to prepare artifact directory")?,
    );

    let pipeline = UploadPipeline::new(prober, transcoder, staging, store.clone(), pipeline_config);

    Ok(Arc::new(AppState {
        pipeline: Arc::new(pipeline),
        janitor: Janitor::new(store),
    }))
}
