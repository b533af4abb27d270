//! Data models for the application
//!
//! Request and response shapes shared by the pipeline and the HTTP API.

mod cache;
mod metadata;
mod upload;

// Re-export all models for convenient imports
pub use cache::*;
pub use metadata::*;
pub use upload::*;
