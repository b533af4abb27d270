//! ffprobe-backed metadata prober

use crate::command::ToolRunner;
use crate::traits::MetadataProber;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tunedrop_core::Metadata;

#[derive(Debug, Default, Deserialize)]
struct FFprobeOutput {
    #[serde(default)]
    format: Option<FFprobeFormat>,
    #[serde(default)]
    streams: Vec<FFprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FFprobeFormat {
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct FFprobeStream {
    codec_type: Option<String>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

pub struct FfprobeProber {
    runner: ToolRunner,
}

impl FfprobeProber {
    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    fn args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "quiet".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            "-show_streams".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl MetadataProber for FfprobeProber {
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    async fn probe(&self, path: &Path) -> Result<Metadata> {
        let output = self.runner.run(&Self::args(path), true).await?;

        if !output.success {
            return Err(anyhow!(
                "{} exited with {:?}: {}",
                self.runner.program(),
                output.exit_code,
                output.stderr_tail()
            ));
        }

        parse_probe_output(&output.stdout)
    }
}

/// Parse ffprobe JSON and pick title and artist.
pub fn parse_probe_output(json: &[u8]) -> Result<Metadata> {
    let probe: FFprobeOutput =
        serde_json::from_slice(json).context("Failed to parse ffprobe output")?;
    Ok(metadata_from_probe(&probe))
}

// First audio stream wins over the container; tag keys are matched without
// case because Vorbis comments come back upper-cased.
fn metadata_from_probe(probe: &FFprobeOutput) -> Metadata {
    let stream_tags = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .map(|s| &s.tags);
    let format_tags = probe.format.as_ref().map(|f| &f.tags);

    let lookup = |key: &str| {
        stream_tags
            .and_then(|tags| tag(tags, key))
            .or_else(|| format_tags.and_then(|tags| tag(tags, key)))
    };

    let defaults = Metadata::unknown();
    Metadata {
        title: lookup("title").unwrap_or(defaults.title),
        artist: lookup("artist").unwrap_or(defaults.artist),
    }
}

/// Exact key first, then the first case-insensitive match in key order.
fn tag(tags: &BTreeMap<String, String>, key: &str) -> Option<String> {
    let non_blank = |v: &String| {
        let v = v.trim();
        (!v.is_empty()).then(|| v.to_string())
    };

    tags.get(key).and_then(non_blank).or_else(|| {
        tags.iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .find_map(|(_, v)| non_blank(v))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_stream_tags_win_over_format_tags() {
        let json = br#"{
            "streams": [
                {"codec_type": "video", "tags": {"title": "Cover"}},
                {"codec_type": "audio", "tags": {"title": "Stream Title"}}
            ],
            "format": {"tags": {"title": "Format Title", "artist": "Format Artist"}}
        }"#;

        let metadata = parse_probe_output(json).unwrap();
        assert_eq!(metadata.title, "Stream Title");
        assert_eq!(metadata.artist, "Format Artist");
    }

    #[test]
    fn test_first_audio_stream_is_used() {
        let json = br#"{
            "streams": [
                {"codec_type": "audio", "tags": {"artist": "First"}},
                {"codec_type": "audio", "tags": {"artist": "Second"}}
            ]
        }"#;

        let metadata = parse_probe_output(json).unwrap();
        assert_eq!(metadata.artist, "First");
        assert_eq!(metadata.title, "Unknown Title");
    }

    #[test]
    fn test_uppercase_vorbis_tags() {
        let json = br#"{
            "streams": [{"codec_type": "audio", "tags": {"TITLE": "So What", "ARTIST": "Miles Davis"}}],
            "format": {}
        }"#;

        let metadata = parse_probe_output(json).unwrap();
        assert_eq!(metadata, Metadata::new("So What", "Miles Davis"));
    }

    #[test]
    fn test_exact_key_wins_over_other_casing() {
        let json = br#"{
            "streams": [{"codec_type": "audio", "tags": {"TITLE": "Upper", "Title": "Mixed", "title": "Lower"}}]
        }"#;

        for _ in 0..8 {
            assert_eq!(parse_probe_output(json).unwrap().title, "Lower");
        }

        let json = br#"{
            "streams": [{"codec_type": "audio", "tags": {"Title": "Mixed", "TITLE": "Upper"}}]
        }"#;
        assert_eq!(parse_probe_output(json).unwrap().title, "Upper");
    }

    #[test]
    fn test_blank_stream_tag_falls_back_to_format() {
        let json = br#"{
            "streams": [{"codec_type": "audio", "tags": {"title": "  "}}],
            "format": {"tags": {"title": "Format Title"}}
        }"#;

        assert_eq!(parse_probe_output(json).unwrap().title, "Format Title");
    }

    #[test]
    fn test_no_tags_yields_sentinels() {
        let metadata = parse_probe_output(b"{}").unwrap();
        assert!(metadata.is_unknown());
    }

    #[test]
    fn test_malformed_output_is_error() {
        assert!(parse_probe_output(b"not json").is_err());
    }

    #[tokio::test]
    async fn test_missing_tool_falls_back_to_unknown() {
        let prober = FfprobeProber::new(ToolRunner::new(
            "tunedrop-no-such-ffprobe",
            Duration::from_secs(5),
        ));

        assert!(prober.probe(Path::new("song.mp3")).await.is_err());
        assert!(prober
            .probe_or_unknown(Path::new("song.mp3"))
            .await
            .is_unknown());
    }
}
