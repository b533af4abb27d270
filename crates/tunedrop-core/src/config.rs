//! Configuration module
//!
//! Configuration is read once at startup from the environment (a `.env` file is
//! honoured) and handed to the services by value. Nothing reads the environment
//! after `Config::from_env` returns.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const SERVER_PORT: u16 = 5000;
const MAX_UPLOAD_SIZE_MB: usize = 200;
const MAX_CONCURRENT_TRANSCODES: usize = 4;
const TOOL_TIMEOUT_SECS: u64 = 300;
const AUDIO_BITRATE_KBPS: u32 = 192;
const AUDIO_CHANNELS: u8 = 2;

/// Target format of the transcoded audio and the extracted artwork.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscodeSettings {
    /// Encoder handed to ffmpeg (`-c:a`)
    pub audio_codec: String,
    /// Extension of the processed audio artifact, also selects the container
    pub audio_extension: String,
    pub audio_bitrate_kbps: u32,
    pub audio_channels: u8,
    pub artwork_extension: String,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            audio_codec: "libopus".to_string(),
            audio_extension: "opus".to_string(),
            audio_bitrate_kbps: AUDIO_BITRATE_KBPS,
            audio_channels: AUDIO_CHANNELS,
            artwork_extension: "jpg".to_string(),
        }
    }
}

/// Everything the upload pipeline needs: directories, tool locations and the
/// target format.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Staging area for source uploads
    pub upload_dir: PathBuf,
    /// Artifact store
    pub artifact_dir: PathBuf,
    /// URL prefix under which the artifact store is served
    pub artifact_url_prefix: String,
    /// Where failed sources are moved; deleted when unset
    pub quarantine_dir: Option<PathBuf>,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Upper bound for a single external tool invocation
    pub tool_timeout: Duration,
    pub transcode: TranscodeSettings,
}

impl PipelineConfig {
    /// Pipeline configuration with default tools and target format, rooted at
    /// the given directories.
    pub fn new(upload_dir: impl Into<PathBuf>, artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            artifact_dir: artifact_dir.into(),
            artifact_url_prefix: "/static/processed".to_string(),
            quarantine_dir: None,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            tool_timeout: Duration::from_secs(TOOL_TIMEOUT_SECS),
            transcode: TranscodeSettings::default(),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload_dir == self.artifact_dir {
            return Err(anyhow::anyhow!(
                "UPLOAD_DIR and ARTIFACT_DIR must point to different directories"
            ));
        }

        if let Some(quarantine) = &self.quarantine_dir {
            if quarantine == &self.upload_dir || quarantine == &self.artifact_dir {
                return Err(anyhow::anyhow!(
                    "QUARANTINE_DIR must differ from UPLOAD_DIR and ARTIFACT_DIR"
                ));
            }
        }

        if self.ffmpeg_path.trim().is_empty() || self.ffprobe_path.trim().is_empty() {
            return Err(anyhow::anyhow!("FFMPEG_PATH and FFPROBE_PATH must not be empty"));
        }

        if self.tool_timeout.is_zero() {
            return Err(anyhow::anyhow!("TOOL_TIMEOUT_SECS must be greater than 0"));
        }

        if !self.artifact_url_prefix.starts_with('/') {
            return Err(anyhow::anyhow!("ARTIFACT_URL_PREFIX must start with '/'"));
        }
        if self.artifact_url_prefix.trim_end_matches('/').is_empty() {
            return Err(anyhow::anyhow!("ARTIFACT_URL_PREFIX must not be the root path"));
        }

        let transcode = &self.transcode;
        if transcode.audio_codec.trim().is_empty() {
            return Err(anyhow::anyhow!("AUDIO_CODEC must not be empty"));
        }
        if transcode.audio_bitrate_kbps == 0 {
            return Err(anyhow::anyhow!("AUDIO_BITRATE_KBPS must be greater than 0"));
        }
        if transcode.audio_channels == 0 {
            return Err(anyhow::anyhow!("AUDIO_CHANNELS must be greater than 0"));
        }
        validate_extension("AUDIO_EXTENSION", &transcode.audio_extension)?;
        validate_extension("ARTWORK_EXTENSION", &transcode.artwork_extension)?;

        Ok(())
    }
}

fn validate_extension(name: &str, extension: &str) -> Result<(), anyhow::Error> {
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(anyhow::anyhow!(
            "{} must be a plain alphanumeric extension, got '{}'",
            name,
            extension
        ));
    }
    Ok(())
}

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub max_upload_size_bytes: usize,
    pub max_concurrent_transcodes: usize,
    /// Emit logs as JSON lines (`LOG_FORMAT=json`)
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            max_concurrent_transcodes: MAX_CONCURRENT_TRANSCODES,
            log_json: false,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server = ServerConfig {
            server_port: env_or("SERVER_PORT", SERVER_PORT),
            environment,
            cors_origins,
            max_upload_size_bytes: env_or("MAX_UPLOAD_SIZE_MB", MAX_UPLOAD_SIZE_MB) * 1024 * 1024,
            max_concurrent_transcodes: env_or(
                "MAX_CONCURRENT_TRANSCODES",
                MAX_CONCURRENT_TRANSCODES,
            ),
            log_json: env::var("LOG_FORMAT")
                .map(|v| v.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        let defaults = TranscodeSettings::default();
        let transcode = TranscodeSettings {
            audio_codec: env::var("AUDIO_CODEC").unwrap_or(defaults.audio_codec),
            audio_extension: env::var("AUDIO_EXTENSION")
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .unwrap_or(defaults.audio_extension),
            audio_bitrate_kbps: env_or("AUDIO_BITRATE_KBPS", defaults.audio_bitrate_kbps),
            audio_channels: env_or("AUDIO_CHANNELS", defaults.audio_channels),
            artwork_extension: env::var("ARTWORK_EXTENSION")
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .unwrap_or(defaults.artwork_extension),
        };

        let pipeline = PipelineConfig {
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            artifact_dir: env::var("ARTIFACT_DIR")
                .unwrap_or_else(|_| Path::new("static").join("processed").display().to_string())
                .into(),
            artifact_url_prefix: env::var("ARTIFACT_URL_PREFIX")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "/static/processed".to_string()),
            quarantine_dir: env::var("QUARANTINE_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            tool_timeout: Duration::from_secs(env_or("TOOL_TIMEOUT_SECS", TOOL_TIMEOUT_SECS)),
            transcode,
        };

        let config = Config { server, pipeline };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.server.max_concurrent_transcodes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_TRANSCODES must be greater than 0"
            ));
        }

        if self.is_production() && self.server.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS must list explicit origins in production"
            ));
        }

        self.pipeline.validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.server.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.server.server_port
    }

    pub fn environment(&self) -> &str {
        &self.server.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.server.cors_origins
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.server.max_upload_size_bytes
    }

    pub fn max_concurrent_transcodes(&self) -> usize {
        self.server.max_concurrent_transcodes
    }

    pub fn log_json(&self) -> bool {
        self.server.log_json
    }

    /// Artifact URL prefix without trailing slashes
    pub fn artifact_url_prefix(&self) -> &str {
        self.pipeline.artifact_url_prefix.trim_end_matches('/')
    }
}

/// Read and parse an environment variable, falling back to `default` when it is
/// unset or unparsable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                server_port: 5000,
                environment: "development".to_string(),
                cors_origins: vec!["*".to_string()],
                max_upload_size_bytes: 1024,
                max_concurrent_transcodes: 1,
                log_json: false,
            },
            pipeline: PipelineConfig::new("uploads", "static/processed"),
        }
    }

    #[test]
    fn test_default_transcode_settings() {
        let settings = TranscodeSettings::default();
        assert_eq!(settings.audio_codec, "libopus");
        assert_eq!(settings.audio_extension, "opus");
        assert_eq!(settings.audio_bitrate_kbps, 192);
        assert_eq!(settings.audio_channels, 2);
        assert_eq!(settings.artwork_extension, "jpg");
    }

    #[test]
    fn test_valid_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_same_directories_rejected() {
        let mut config = test_config();
        config.pipeline.artifact_dir = config.pipeline.upload_dir.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_quarantine_must_be_separate() {
        let mut config = test_config();
        config.pipeline.quarantine_dir = Some(config.pipeline.upload_dir.clone());
        assert!(config.validate().is_err());

        config.pipeline.quarantine_dir = Some(PathBuf::from("failed"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut config = test_config();
        config.pipeline.transcode.audio_bitrate_kbps = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.pipeline.transcode.audio_channels = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.pipeline.tool_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.server.max_concurrent_transcodes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_extension_with_separator_rejected() {
        let mut config = test_config();
        config.pipeline.transcode.audio_extension = "../opus".to_string();
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.pipeline.transcode.artwork_extension = "tar.gz".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_url_prefix_must_be_absolute() {
        let mut config = test_config();
        config.pipeline.artifact_url_prefix = "static/processed".to_string();
        assert!(config.validate().is_err());

        config.pipeline.artifact_url_prefix = "/".to_string();
        assert!(config.validate().is_err());

        config.pipeline.artifact_url_prefix = "/files/".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.artifact_url_prefix(), "/files");
    }

    #[test]
    fn test_default_server_config() {
        let server = ServerConfig::default();
        assert_eq!(server.server_port, 5000);
        assert_eq!(server.max_upload_size_bytes, 200 * 1024 * 1024);
        assert_eq!(server.max_concurrent_transcodes, 4);
        assert!(!server.log_json);
    }

    #[test]
    fn test_is_production() {
        let mut config = test_config();
        assert!(!config.is_production());
        config.server.environment = "Prod".to_string();
        assert!(config.is_production());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let mut config = test_config();
        config.server.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.server.cors_origins = vec!["https://tunedrop.example".to_string()];
        assert!(config.validate().is_ok());
    }
}
