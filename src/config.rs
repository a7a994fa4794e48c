//! Startup configuration from the environment.
//!
//! An optional `.env` in the working directory is loaded first, so
//! development overrides don't need exporting by hand.
//!
//!   LUMINA_SETTINGS_PATH     settings document (default: <config>/lumina/settings.json)
//!   LUMINA_CAPTURE_PROTOCOL  `events` or `sync` (default: events)

use crate::capture::CaptureProtocol;
use crate::settings::SETTINGS_FILE;
use std::path::PathBuf;

pub const ENV_SETTINGS_PATH: &str = "LUMINA_SETTINGS_PATH";
pub const ENV_CAPTURE_PROTOCOL: &str = "LUMINA_CAPTURE_PROTOCOL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub settings_path: PathBuf,
    pub capture_protocol: CaptureProtocol,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            capture_protocol: CaptureProtocol::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("[CONFIG] Loaded {}", path.display());
        }
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_SETTINGS_PATH).filter(|p| !p.trim().is_empty()) {
            config.settings_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(ENV_CAPTURE_PROTOCOL) {
            config.capture_protocol = raw.parse().map_err(|reason| ConfigError::Invalid {
                var: ENV_CAPTURE_PROTOCOL,
                reason,
            })?;
        }

        Ok(config)
    }
}

/// Settings location in the platform config directory:
///   macOS:   ~/Library/Application Support/lumina/settings.json
///   Linux:   ~/.config/lumina/settings.json
///   Windows: %APPDATA%/lumina/settings.json
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lumina")
        .join(SETTINGS_FILE)
}
