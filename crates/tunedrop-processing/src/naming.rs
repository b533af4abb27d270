//! Artifact naming
//!
//! Every upload gets a fresh 128-bit identifier; both artifact filenames are
//! derived from it, so concurrent requests never write the same file.

use tunedrop_core::constants::{ARTWORK_ARTIFACT_PREFIX, AUDIO_ARTIFACT_PREFIX};
use tunedrop_core::TranscodeSettings;
use uuid::Uuid;

/// Filenames of the artifacts one upload may produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    /// 32 lowercase hex characters
    pub request_id: String,
    pub audio: String,
    pub artwork: String,
}

impl ArtifactNames {
    /// Generate a new identifier and derive the names from it.
    pub fn generate(settings: &TranscodeSettings) -> Self {
        let request_id = Uuid::new_v4().simple().to_string();
        Self::for_request(request_id, settings)
    }

    /// Derive the names for an existing identifier.
    pub fn for_request(request_id: impl Into<String>, settings: &TranscodeSettings) -> Self {
        let request_id = request_id.into();
        Self {
            audio: format!(
                "{}{}.{}",
                AUDIO_ARTIFACT_PREFIX, request_id, settings.audio_extension
            ),
            artwork: format!(
                "{}{}.{}",
                ARTWORK_ARTIFACT_PREFIX, request_id, settings.artwork_extension
            ),
            request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_lower_hex(s: &str) -> bool {
        s.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[test]
    fn test_generated_names_follow_pattern() {
        let names = ArtifactNames::generate(&TranscodeSettings::default());

        assert_eq!(names.request_id.len(), 32);
        assert!(is_lower_hex(&names.request_id));
        assert_eq!(names.audio, format!("processed_{}.opus", names.request_id));
        assert_eq!(names.artwork, format!("art_{}.jpg", names.request_id));
    }

    #[test]
    fn test_names_follow_settings() {
        let settings = TranscodeSettings {
            audio_extension: "ogg".to_string(),
            artwork_extension: "png".to_string(),
            ..TranscodeSettings::default()
        };

        let names = ArtifactNames::for_request("abc", &settings);
        assert_eq!(names.audio, "processed_abc.ogg");
        assert_eq!(names.artwork, "art_abc.png");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let settings = TranscodeSettings::default();
        let ids: HashSet<String> = (0..1000)
            .map(|_| ArtifactNames::generate(&settings).request_id)
            .collect();
        assert_eq!(ids.len(), 1000);
    }
}
