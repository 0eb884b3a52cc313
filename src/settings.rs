//! User preferences backed by a key-value store.
//!
//! [`Settings`] is handed to whatever needs it; the storage behind it is a
//! [`KeyValueStore`], either a JSON file on disk or an in-memory map.

use crate::error::SettingsError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Key of the "show English titles" preference.
pub const USE_ENGLISH_TITLE_KEY: &str = "use_english_title";

/// Default settings filename inside the config directory.
pub const SETTINGS_FILENAME: &str = "settings.json";

/// String-keyed storage of JSON values.
pub trait KeyValueStore {
    /// Returns the stored value, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores a value. Fails if it cannot be persisted.
    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
}

/// Store that lives only as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store persisted as a single JSON object file.
///
/// The file is read once on open and rewritten on every `set`. Concurrent
/// writers are not coordinated; the last write wins.
#[derive(Debug)]
pub struct FileStore {
    filepath: PathBuf,
    values: Map<String, Value>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, SettingsError> {
        let values = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            if content.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&content) {
                    Ok(Value::Object(map)) => map,
                    Ok(_) => {
                        return Err(SettingsError::ParseError(format!(
                            "{} is not a JSON object",
                            path.display()
                        )));
                    }
                    Err(e) => return Err(SettingsError::ParseError(e.to_string())),
                }
            }
        } else {
            Map::new()
        };

        Ok(Self {
            filepath: path.to_path_buf(),
            values,
        })
    }

    /// Get the filepath for this store.
    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    fn save(&self, key: &str) -> Result<(), SettingsError> {
        let write_error = |message: String| SettingsError::WriteError {
            key: key.to_string(),
            message,
        };

        if let Some(parent) = self.filepath.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(&self.values)
            .map_err(|e| write_error(e.to_string()))?;
        std::fs::write(&self.filepath, content).map_err(|e| write_error(e.to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let previous = self.values.insert(key.to_string(), value);

        // Keep memory and disk in agreement when the write fails
        if let Err(e) = self.save(key) {
            match previous {
                Some(old) => self.values.insert(key.to_string(), old),
                None => self.values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

/// Typed access to user preferences.
#[derive(Debug)]
pub struct Settings<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Settings<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reads `key`, falling back to `default` when unset or of the wrong type.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.store
            .get(key)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or(default)
    }

    /// Writes `key` through to the store.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), SettingsError> {
        let value = serde_json::to_value(value).map_err(|e| SettingsError::WriteError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(key, value)
    }

    /// Whether English titles are shown instead of romanized ones.
    pub fn use_english_title(&self) -> bool {
        self.get_or(USE_ENGLISH_TITLE_KEY, false)
    }

    pub fn set_use_english_title(&mut self, enabled: bool) -> Result<(), SettingsError> {
        self.set(USE_ENGLISH_TITLE_KEY, enabled)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl Settings<FileStore> {
    /// Opens settings persisted at `path`.
    pub fn open(path: &Path) -> Result<Self, SettingsError> {
        Ok(Self::new(FileStore::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_is_false() {
        let settings = Settings::new(MemoryStore::new());
        assert!(!settings.use_english_title());
    }

    #[test]
    fn test_reads_reflect_last_write() {
        let mut settings = Settings::new(MemoryStore::new());

        settings.set_use_english_title(true).unwrap();
        assert!(settings.use_english_title());
        assert!(settings.use_english_title());

        settings.set_use_english_title(false).unwrap();
        assert!(!settings.use_english_title());
    }

    #[test]
    fn test_wrong_type_falls_back_to_default() {
        let mut settings = Settings::new(MemoryStore::new());
        settings.set(USE_ENGLISH_TITLE_KEY, "yes").unwrap();
        assert!(!settings.use_english_title());
        assert_eq!(settings.get_or("missing", 7u32), 7);
    }

    #[test]
    fn test_file_store_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILENAME);

        let mut settings = Settings::open(&path).unwrap();
        assert!(!settings.use_english_title());
        settings.set_use_english_title(true).unwrap();

        let reopened = Settings::open(&path).unwrap();
        assert!(reopened.use_english_title());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains(r#""use_english_title": true"#));
    }

    #[test]
    fn test_file_store_keeps_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let mut settings = Settings::open(&path).unwrap();
        settings.set_use_english_title(true).unwrap();

        let reopened = Settings::open(&path).unwrap();
        assert_eq!(reopened.get_or("theme", String::new()), "dark");
    }

    #[test]
    fn test_file_store_rejects_non_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(&path, "[1, 2]").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(SettingsError::ParseError(_))
        ));
    }

    #[test]
    fn test_failed_write_propagates() {
        let dir = TempDir::new().unwrap();
        // The store's parent is a regular file, so the directory can't be created
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join(SETTINGS_FILENAME);

        let mut settings = Settings::open(&path).unwrap();
        let err = settings.set_use_english_title(true).unwrap_err();
        assert!(matches!(err, SettingsError::WriteError { .. }));
        assert!(!settings.use_english_title());
    }
}
