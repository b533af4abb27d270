//! Fake tool implementations for tests.
//!
//! They write plausible files to the requested targets instead of spawning
//! ffprobe or ffmpeg.

use crate::traits::{MetadataProber, Transcoder};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tunedrop_core::{Metadata, TranscodeSettings};

/// Bytes written as the transcoded audio by [`FakeTranscoder`].
pub const FAKE_AUDIO: &[u8] = b"OggS\x00\x02fake-opus";

/// Bytes written as artwork when [`FakeTranscoder::with_artwork`] is used.
pub const FAKE_ARTWORK: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg";

/// Prober returning a fixed result.
pub struct FakeProber {
    metadata: Option<Metadata>,
}

impl FakeProber {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata: Some(metadata),
        }
    }

    /// Prober that behaves like a missing or crashing ffprobe.
    pub fn failing() -> Self {
        Self { metadata: None }
    }
}

#[async_trait]
impl MetadataProber for FakeProber {
    async fn probe(&self, path: &Path) -> Result<Metadata, anyhow::Error> {
        if !path.exists() {
            return Err(anyhow::anyhow!("{} does not exist", path.display()));
        }
        self.metadata
            .clone()
            .ok_or_else(|| anyhow::anyhow!("ffprobe exited with Some(1)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AudioBehaviour {
    Succeed,
    /// Tool reports success but leaves an empty file
    SucceedEmpty,
    /// Tool fails after writing part of the output
    FailPartial,
    /// Tool fails without writing anything
    Fail,
}

/// Transcoder writing fixed artifacts.
pub struct FakeTranscoder {
    artwork: bool,
    audio: AudioBehaviour,
    delay: Option<Duration>,
    calls: Mutex<Vec<PathBuf>>,
}

impl FakeTranscoder {
    /// Source without an embedded picture whose audio transcodes fine.
    pub fn new() -> Self {
        Self {
            artwork: false,
            audio: AudioBehaviour::Succeed,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_artwork(mut self) -> Self {
        self.artwork = true;
        self
    }

    pub fn failing_audio(mut self) -> Self {
        self.audio = AudioBehaviour::Fail;
        self
    }

    pub fn partial_audio(mut self) -> Self {
        self.audio = AudioBehaviour::FailPartial;
        self
    }

    pub fn empty_audio(mut self) -> Self {
        self.audio = AudioBehaviour::SucceedEmpty;
        self
    }

    /// Sleep before writing the audio artifact.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Targets written so far, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, target: &Path) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(target.to_path_buf());
        }
    }
}

impl Default for FakeTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn extract_artwork(&self, source: &Path, target: &Path) -> bool {
        self.record(target);
        if !self.artwork || !source.exists() {
            return false;
        }
        tokio::fs::write(target, FAKE_ARTWORK).await.is_ok()
    }

    async fn transcode_audio(
        &self,
        source: &Path,
        target: &Path,
        _settings: &TranscodeSettings,
    ) -> bool {
        self.record(target);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if !source.exists() {
            return false;
        }

        match self.audio {
            AudioBehaviour::Succeed => tokio::fs::write(target, FAKE_AUDIO).await.is_ok(),
            AudioBehaviour::SucceedEmpty => tokio::fs::write(target, b"").await.is_ok(),
            AudioBehaviour::FailPartial => {
                let _ = tokio::fs::write(target, &FAKE_AUDIO[..4]).await;
                false
            }
            AudioBehaviour::Fail => false,
        }
    }
}
