//! Tunedrop Media Processing Library
//!
//! This crate turns one uploaded file into its artifacts: it names them, probes
//! the source with ffprobe, extracts artwork and transcodes audio with ffmpeg,
//! and sequences all of it in the upload pipeline.

pub mod command;
pub mod naming;
pub mod pipeline;
pub mod probe;
pub mod traits;
pub mod transcode;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export commonly used types
pub use command::{ToolError, ToolOutput, ToolRunner};
pub use naming::ArtifactNames;
pub use pipeline::{Stage, UploadPipeline};
pub use probe::FfprobeProber;
pub use traits::{MetadataProber, Transcoder};
pub use transcode::FfmpegTranscoder;
