//! Name rules shared by the staging area and the artifact store.

use crate::error::{StorageError, StorageResult};

const FALLBACK_UPLOAD_NAME: &str = "upload";
const MAX_UPLOAD_NAME_LEN: usize = 128;

/// Reject anything that is not a single flat filename.
pub fn validate_artifact_name(name: &str) -> StorageResult<()> {
    if name.is_empty() {
        return Err(StorageError::InvalidName("name is empty".to_string()));
    }

    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(StorageError::InvalidName(format!(
            "{} contains a path separator",
            name
        )));
    }

    if name == "." || name.contains("..") {
        return Err(StorageError::InvalidName(format!(
            "{} contains directory traversal",
            name
        )));
    }

    Ok(())
}

/// Reduce a client-supplied filename to a safe flat name, keeping its
/// extension so the inspection tool can still guess the container.
pub fn sanitize_upload_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    let cleaned = cleaned.replace("..", "_");

    if cleaned.is_empty() {
        return FALLBACK_UPLOAD_NAME.to_string();
    }

    if cleaned.len() > MAX_UPLOAD_NAME_LEN {
        // Keep the tail so the extension survives
        let start = cleaned.len() - MAX_UPLOAD_NAME_LEN;
        return cleaned[start..].to_string();
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_plain_names() {
        assert!(validate_artifact_name("processed_abc.opus").is_ok());
        assert!(validate_artifact_name("art_abc.jpg").is_ok());
    }

    #[test]
    fn test_validate_rejects_traversal() {
        assert!(validate_artifact_name("").is_err());
        assert!(validate_artifact_name("../secret").is_err());
        assert!(validate_artifact_name("..").is_err());
        assert!(validate_artifact_name("sub/file.opus").is_err());
        assert!(validate_artifact_name("sub\\file.opus").is_err());
        assert!(validate_artifact_name("/etc/passwd").is_err());
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_upload_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_upload_filename("C:\\music\\song.flac"), "song.flac");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_upload_filename("My Song (live).mp3"), "My_Song__live_.mp3");
        assert_eq!(sanitize_upload_filename("曲.m4a"), "_.m4a");
    }

    #[test]
    fn test_sanitize_hidden_and_empty() {
        assert_eq!(sanitize_upload_filename(".hidden.wav"), "hidden.wav");
        assert_eq!(sanitize_upload_filename("..."), "upload");
        assert_eq!(sanitize_upload_filename("dir/"), "upload");
    }

    #[test]
    fn test_sanitize_truncates_keeping_extension() {
        let long = format!("{}.flac", "a".repeat(300));
        let sanitized = sanitize_upload_filename(&long);
        assert_eq!(sanitized.len(), 128);
        assert!(sanitized.ends_with(".flac"));
    }
}
