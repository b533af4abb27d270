//! Tunedrop Core Library
//!
//! This crate provides the configuration, error types and shared models used by
//! every Tunedrop component: the storage layer, the processing pipeline and the
//! HTTP API.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, PipelineConfig, ServerConfig, TranscodeSettings};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    ClearStoreResponse, DeleteCacheResponse, Metadata, UploadRequest, UploadResponse,
};
