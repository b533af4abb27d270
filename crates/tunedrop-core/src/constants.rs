//! Shared constants

/// Title reported when no probe data is available.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Artist reported when no probe data is available.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Filename prefix of transcoded audio artifacts.
pub const AUDIO_ARTIFACT_PREFIX: &str = "processed_";

/// Filename prefix of extracted artwork artifacts.
pub const ARTWORK_ARTIFACT_PREFIX: &str = "art_";

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD_NAME: &str = "file";
