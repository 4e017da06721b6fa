//! Configuration management for just-talk.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, endpoint resolution, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{AudioConfig, BehaviourConfig, WebhookConfig},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use just_talk_core::{PLACEHOLDER_ENDPOINT, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upload endpoint configuration.
    #[serde(default)]
    pub webhook: WebhookConfig,
    /// Audio capture configuration.
    #[serde(default)]
    pub audio: AudioConfig,
    /// Application behavior settings.
    #[serde(default)]
    pub behavior: BehaviourConfig,
}

#[track_caller]
fn config_error(reason: String) -> AppError {
    AppError::ConfigError {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    ///
    /// The webhook URL is NOT required here. A missing or placeholder URL
    /// resolves to no endpoint (see [`Config::resolve_endpoint`]) so the app
    /// can start and record; uploads are then refused with a configuration
    /// notice.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from an explicit path.
    #[track_caller]
    #[instrument]
    pub fn load_from(config_path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(config_path)
            .map_err(|e| config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| config_error(format!("Failed to parse config: {}", e)))?;

        info!(
            config_path = ?config_path,
            environment = %config.webhook.environment,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Resolve the webhook URL for the active environment.
    ///
    /// Returns `Ok(None)` when the URL is empty or still the placeholder,
    /// and an error when it is set but not a valid http(s) URL.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn resolve_endpoint(&self) -> AppResult<Option<Url>> {
        let raw = self.webhook.active_url().trim();

        if raw.is_empty() || raw == PLACEHOLDER_ENDPOINT {
            warn!(
                environment = %self.webhook.environment,
                "Webhook URL not configured, uploads will be refused"
            );
            return Ok(None);
        }

        let url: Url = raw
            .parse()
            .map_err(|e| config_error(format!("Invalid webhook URL {:?}: {}", raw, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(config_error(format!(
                "Webhook URL must be http or https, got {:?}",
                url.scheme()
            )));
        }

        info!(
            environment = %self.webhook.environment,
            endpoint = %url,
            "Webhook endpoint resolved"
        );

        Ok(Some(url))
    }

    /// Upload request timeout.
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook.timeout_secs)
    }

    /// Directory for span files: configured, else the platform cache dir.
    #[track_caller]
    pub fn recordings_dir(&self) -> AppResult<PathBuf> {
        if let Some(dir) = &self.audio.recordings_dir {
            return Ok(dir.clone());
        }

        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.cache_dir().join("recordings"))
    }

    /// Save configuration to an explicit path.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| config_error(format!("Failed to serialize config: {}", e)))?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path)
            .map_err(|e| config_error(format!("Failed to create temp config file: {}", e)))?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| config_error(format!("Failed to write temp config file: {}", e)))?;

        temp_file
            .sync_all()
            .map_err(|e| config_error(format!("Failed to sync temp config file: {}", e)))?;

        fs::rename(&temp_path, config_path).map_err(|e| {
            config_error(format!("Failed to rename temp config to final: {}", e))
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Location of the config file.
    #[track_caller]
    pub fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "just-talk", "Just-Talk")
            .ok_or_else(|| config_error("Failed to get project directories".to_string()))
    }

    #[track_caller]
    fn create_default(config_path: &Path) -> AppResult<Self> {
        let config = Config::default();

        config.save_to(config_path)?;

        warn!(
            config_path = ?config_path,
            "Default config created. Set the webhook URL before sending recordings."
        );

        Ok(config)
    }
}
