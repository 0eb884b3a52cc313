//! Error types for tachimeta.
//!
//! Each concern gets its own `thiserror` enum so callers can tell a
//! catalog failure from a bad export file or an unwritable settings store.

use thiserror::Error;

/// Errors raised while talking to the AniList catalog.
#[derive(Error, Debug)]
pub enum AnilistError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API answered with an error status or a GraphQL `errors` array
    #[error("AniList API error: {0}")]
    Api(String),

    /// Response body did not match the expected shape
    #[error("Failed to parse AniList response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A media entry broke an invariant of the catalog contract
    #[error("Invalid media entry {id}: {message}")]
    InvalidMedia { id: u64, message: String },

    /// No media with the requested id
    #[error("Media not found: {0}")]
    NotFound(u64),
}

/// Errors raised while reading or writing Tachiyomi export files.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Status code outside the seven known values
    #[error("Invalid Tachiyomi status code: {0:?}")]
    InvalidStatus(String),

    /// Filesystem failure
    #[error("Failed to access export file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed `details.json`
    #[error("Failed to parse details.json: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Errors raised by the persistent settings store.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read the settings file
    #[error("Failed to read settings: {0}")]
    ReadError(#[from] std::io::Error),

    /// Settings file is not a JSON object
    #[error("Failed to parse settings: {0}")]
    ParseError(String),

    /// Failed to persist a value
    #[error("Failed to save setting '{key}': {message}")]
    WriteError { key: String, message: String },
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Result type alias using anyhow for application-level error handling.
pub type Result<T> = anyhow::Result<T>;
