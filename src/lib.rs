//! tachimeta - AniList lookups and Tachiyomi metadata export.
//!
//! This library provides functionality for:
//! - Searching the AniList manga catalog
//! - Writing Tachiyomi local-source `details.json` files
//! - Persisting user preferences such as English-title display
//! - Producing the Google Analytics bootstrap snippet

pub mod analytics;
pub mod anilist;
pub mod config;
pub mod console;
pub mod error;
pub mod export;
pub mod settings;
pub mod tachiyomi;
pub mod utils;

// Re-export commonly used types
pub use anilist::{AnilistClient, CatalogSource, Media, MediaFormat, MediaStatus};
pub use config::Config;
pub use console::Console;
pub use error::{AnilistError, ConfigError, ExportError, SettingsError};
pub use export::{ExportFailure, ExportedSeries, Exporter};
pub use settings::{FileStore, KeyValueStore, MemoryStore, Settings};
pub use tachiyomi::{TachiyomiEntry, TachiyomiStatus};
