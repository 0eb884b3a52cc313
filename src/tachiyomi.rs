//! Tachiyomi local-source metadata (`details.json`).
//!
//! Tachiyomi reads one `details.json` per series folder. Every field is a
//! string, including the status, which must be one of the seven codes
//! Tachiyomi's `SManga` defines.

use crate::anilist::{Media, MediaStatus};
use crate::error::ExportError;
use crate::utils::html_to_text;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name Tachiyomi looks for inside a series folder.
pub const DETAILS_FILENAME: &str = "details.json";

/// Separator for multi-valued text fields.
const LIST_SEPARATOR: &str = ", ";

/// Reading/publication status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TachiyomiStatus {
    Unknown,
    Ongoing,
    Completed,
    Licensed,
    PublishingFinished,
    Cancelled,
    OnHiatus,
}

impl TachiyomiStatus {
    /// All statuses in code order.
    pub const ALL: [TachiyomiStatus; 7] = [
        TachiyomiStatus::Unknown,
        TachiyomiStatus::Ongoing,
        TachiyomiStatus::Completed,
        TachiyomiStatus::Licensed,
        TachiyomiStatus::PublishingFinished,
        TachiyomiStatus::Cancelled,
        TachiyomiStatus::OnHiatus,
    ];

    /// The literal code written to `details.json`.
    pub fn code(self) -> &'static str {
        match self {
            TachiyomiStatus::Unknown => "0",
            TachiyomiStatus::Ongoing => "1",
            TachiyomiStatus::Completed => "2",
            TachiyomiStatus::Licensed => "3",
            TachiyomiStatus::PublishingFinished => "4",
            TachiyomiStatus::Cancelled => "5",
            TachiyomiStatus::OnHiatus => "6",
        }
    }

    /// Parses a literal code. No trimming or numeric coercion.
    pub fn from_code(code: &str) -> Result<Self, ExportError> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or_else(|| ExportError::InvalidStatus(code.to_string()))
    }

    pub fn label(self) -> &'static str {
        match self {
            TachiyomiStatus::Unknown => "Unknown",
            TachiyomiStatus::Ongoing => "Ongoing",
            TachiyomiStatus::Completed => "Completed",
            TachiyomiStatus::Licensed => "Licensed",
            TachiyomiStatus::PublishingFinished => "Publishing finished",
            TachiyomiStatus::Cancelled => "Cancelled",
            TachiyomiStatus::OnHiatus => "On hiatus",
        }
    }
}

impl FromStr for TachiyomiStatus {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl TryFrom<String> for TachiyomiStatus {
    type Error = ExportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_code(&value)
    }
}

impl From<TachiyomiStatus> for String {
    fn from(status: TachiyomiStatus) -> Self {
        status.code().to_string()
    }
}

impl fmt::Display for TachiyomiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<MediaStatus> for TachiyomiStatus {
    fn from(status: MediaStatus) -> Self {
        match status {
            MediaStatus::Finished => TachiyomiStatus::Completed,
            MediaStatus::Releasing => TachiyomiStatus::Ongoing,
            MediaStatus::NotYetReleased => TachiyomiStatus::Unknown,
            MediaStatus::Cancelled => TachiyomiStatus::Cancelled,
            MediaStatus::Hiatus => TachiyomiStatus::OnHiatus,
        }
    }
}

/// Contents of one `details.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TachiyomiEntry {
    pub title: String,
    pub author: String,
    pub artist: String,
    pub description: String,
    pub genre: String,
    pub status: TachiyomiStatus,
}

impl TachiyomiEntry {
    /// Builds an entry from a catalog record.
    pub fn from_media(media: &Media, prefer_english: bool) -> Self {
        Self {
            title: media.display_title(prefer_english).to_string(),
            author: media.authors().join(LIST_SEPARATOR),
            artist: media.artists().join(LIST_SEPARATOR),
            description: media
                .description
                .as_deref()
                .map(html_to_text)
                .unwrap_or_default(),
            genre: media.genres.join(LIST_SEPARATOR),
            status: media.status.into(),
        }
    }
}

/// Writes `entry` to `<dir>/details.json`, creating `dir` if needed.
pub fn write_details(dir: &Path, entry: &TachiyomiEntry) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(DETAILS_FILENAME);
    let content = serde_json::to_string_pretty(entry)?;
    std::fs::write(&path, content)?;

    Ok(path)
}

/// Reads and validates a `details.json`.
pub fn read_details(path: &Path) -> Result<TachiyomiEntry, ExportError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
