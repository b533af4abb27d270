//! ffmpeg-backed transcode executor

use crate::command::ToolRunner;
use crate::traits::Transcoder;
use async_trait::async_trait;
use std::path::Path;
use tunedrop_core::TranscodeSettings;

pub struct FfmpegTranscoder {
    runner: ToolRunner,
}

impl FfmpegTranscoder {
    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    /// Drop audio, copy the picture stream as is.
    pub fn artwork_args(source: &Path, target: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            source.to_string_lossy().to_string(),
            "-an".to_string(),
            "-vcodec".to_string(),
            "copy".to_string(),
            target.to_string_lossy().to_string(),
        ]
    }

    /// Drop video, re-encode audio at the configured bitrate and layout.
    pub fn audio_args(source: &Path, target: &Path, settings: &TranscodeSettings) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            source.to_string_lossy().to_string(),
            "-c:a".to_string(),
            settings.audio_codec.clone(),
            "-b:a".to_string(),
            format!("{}k", settings.audio_bitrate_kbps),
            "-ac".to_string(),
            settings.audio_channels.to_string(),
            "-vn".to_string(),
            target.to_string_lossy().to_string(),
        ]
    }

    async fn run(&self, operation: &str, args: Vec<String>) -> bool {
        match self.runner.run(&args, false).await {
            Ok(output) if output.success => true,
            Ok(output) => {
                tracing::warn!(
                    operation,
                    exit_code = ?output.exit_code,
                    stderr = %output.stderr_tail(),
                    "ffmpeg failed"
                );
                false
            }
            Err(e) => {
                tracing::warn!(operation, error = %e, "ffmpeg could not run");
                false
            }
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn extract_artwork(&self, source: &Path, target: &Path) -> bool {
        self.run("artwork", Self::artwork_args(source, target)).await
    }

    async fn transcode_audio(
        &self,
        source: &Path,
        target: &Path,
        settings: &TranscodeSettings,
    ) -> bool {
        self.run("audio", Self::audio_args(source, target, settings))
            .await
    }
}
