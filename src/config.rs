//! Configuration management for tachimeta.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories.

use crate::analytics::AnalyticsConfig;
use crate::anilist::client::MAX_PER_PAGE;
use crate::error::ConfigError;
use crate::settings::SETTINGS_FILENAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "tachimeta";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Environment variable overriding `analytics.id`.
pub const ANALYTICS_ID_ENV: &str = "TACHIMETA_ANALYTICS_ID";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog API settings.
    pub anilist: AnilistConfig,

    /// Analytics snippet settings.
    pub analytics: AnalyticsSection,

    /// File paths.
    pub paths: PathsConfig,
}

/// AniList API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnilistConfig {
    /// GraphQL endpoint.
    pub api_url: String,

    /// Results per search page (1-50).
    pub per_page: u32,

    /// Delay between API requests in seconds.
    pub delay_between_requests_sec: f64,
}

impl Default for AnilistConfig {
    fn default() -> Self {
        Self {
            api_url: "https://graphql.anilist.co".to_string(),
            per_page: 10,
            delay_between_requests_sec: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSection {
    /// gtag measurement id. Empty or absent disables analytics.
    pub id: Option<String>,
}

/// File path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory series folders are exported into.
    pub output_directory: PathBuf,

    /// Settings file; defaults to `settings.json` next to the config.
    pub settings_file: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("."),
            settings_file: None,
        }
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.anilist.api_url).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "anilist.api_url".to_string(),
                message: format!("'{}' is not a valid URL", self.anilist.api_url),
            });
        }

        if !(1..=MAX_PER_PAGE).contains(&self.anilist.per_page) {
            return Err(ConfigError::InvalidValue {
                key: "anilist.per_page".to_string(),
                message: format!("must be between 1 and {}", MAX_PER_PAGE),
            });
        }

        if self.anilist.delay_between_requests_sec < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "anilist.delay_between_requests_sec".to_string(),
                message: "must not be negative".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the effective settings file, using config or default.
    pub fn settings_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.settings_file {
            Ok(path.clone())
        } else {
            Ok(Self::config_dir()?.join(SETTINGS_FILENAME))
        }
    }

    /// Analytics id after applying the environment override.
    pub fn analytics_id(&self) -> Option<String> {
        resolve_analytics_id(self.analytics.id.as_deref(), std::env::var(ANALYTICS_ID_ENV).ok())
    }

    /// Builds the analytics inputs for a page served from `hostname`.
    pub fn analytics_config(&self, hostname: &str) -> AnalyticsConfig {
        AnalyticsConfig {
            analytics_id: self.analytics_id(),
            hostname: hostname.to_string(),
        }
    }
}

/// The environment value wins when set, even if empty.
fn resolve_analytics_id(configured: Option<&str>, env: Option<String>) -> Option<String> {
    env.or_else(|| configured.map(str::to_string))
        .filter(|id| !id.trim().is_empty())
}
