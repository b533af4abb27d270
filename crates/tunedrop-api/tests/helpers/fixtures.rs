//! Test fixtures: upload forms and sample payloads.

use axum_test::multipart::{MultipartForm, Part};

pub const TEST_TITLE: &str = "Night Drive";
pub const TEST_ARTIST: &str = "The Examples";

/// Bytes standing in for an uploaded MP3. The fake tools never decode them.
pub const SAMPLE_MP3: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00fake-mp3-frames";

/// Multipart form with a single `file` part.
pub fn upload_form(filename: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(SAMPLE_MP3)
            .file_name(filename)
            .mime_type("audio/mpeg"),
    )
}
