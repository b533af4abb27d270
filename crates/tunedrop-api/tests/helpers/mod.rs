//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p tunedrop-api`. The media tools are
//! replaced by the fakes from `tunedrop-processing`'s `test-helpers` feature.

pub mod fixtures;

use axum_test::TestServer;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tunedrop_api::setup::{routes, services};
use tunedrop_core::{Config, Metadata, PipelineConfig, ServerConfig};
use tunedrop_processing::test_helpers::{FakeProber, FakeTranscoder};
use tunedrop_processing::{MetadataProber, Transcoder};

/// Test application: server and owned directories.
pub struct TestApp {
    pub server: TestServer,
    pub config: Config,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.config.pipeline.upload_dir
    }

    pub fn artifact_dir(&self) -> &PathBuf {
        &self.config.pipeline.artifact_dir
    }

    /// Names of the files currently in a directory, sorted.
    pub fn files_in(&self, dir: &PathBuf) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}

/// Setup test app whose tools find tags and transcode successfully.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(
        Arc::new(FakeProber::new(Metadata::new(
            fixtures::TEST_TITLE,
            fixtures::TEST_ARTIST,
        ))),
        Arc::new(FakeTranscoder::new()),
    )
    .await
}

/// Setup test app with the given tool implementations and isolated directories.
pub async fn setup_test_app_with(
    prober: Arc<dyn MetadataProber>,
    transcoder: Arc<dyn Transcoder>,
) -> TestApp {
    setup_test_app_configured(prober, transcoder, |_| {}).await
}

/// Like [`setup_test_app_with`], letting the caller adjust the config before
/// the router is built.
pub async fn setup_test_app_configured(
    prober: Arc<dyn MetadataProber>,
    transcoder: Arc<dyn Transcoder>,
    configure: impl FnOnce(&mut Config),
) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let mut config = Config {
        server: ServerConfig {
            max_upload_size_bytes: 1024 * 1024,
            ..ServerConfig::default()
        },
        pipeline: PipelineConfig::new(
            temp_dir.path().join("uploads"),
            temp_dir.path().join("static").join("processed"),
        ),
    };

    configure(&mut config);

    let state = services::build_state(&config, prober, transcoder)
        .await
        .expect("Failed to build app state");
    let app = routes::setup_routes(&config, state).expect("Failed to build routes");

    let server =
        TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        config,
        _temp_dir: temp_dir,
    }
}
