use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::{UNKNOWN_ARTIST, UNKNOWN_TITLE};

/// Descriptive tags of an uploaded track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Metadata {
    pub title: String,
    pub artist: String,
}

impl Metadata {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// Record returned whenever probing yields nothing usable.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_TITLE, UNKNOWN_ARTIST)
    }

    pub fn is_unknown(&self) -> bool {
        self.title == UNKNOWN_TITLE && self.artist == UNKNOWN_ARTIST
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::unknown()
    }
}
