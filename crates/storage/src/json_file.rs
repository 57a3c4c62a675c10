use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

use crate::repository::{
    PROGRESS_KEY, PreferenceRepository, ProgressRecord, ProgressRepository, Storage, StorageError,
    THEME_KEY, ThemePref,
};

/// Durable key-value store: one JSON document per key under a base directory.
///
/// This is the desktop stand-in for the browser's local storage; the two keys
/// it ever holds are `safetyHero_data` and `safetyHero_theme`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read_key(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    fn write_key(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::write(self.path_for(key), value).map_err(|e| StorageError::Io(e.to_string()))
    }

    fn remove_key(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }
}

#[async_trait]
impl ProgressRepository for JsonFileStore {
    async fn load_progress(&self) -> Result<Option<ProgressRecord>, StorageError> {
        let Some(raw) = self.read_key(PROGRESS_KEY)? else {
            return Ok(None);
        };
        let record =
            serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        Ok(Some(record))
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.write_key(PROGRESS_KEY, &raw)
    }

    async fn clear_progress(&self) -> Result<(), StorageError> {
        self.remove_key(PROGRESS_KEY)
    }
}

#[async_trait]
impl PreferenceRepository for JsonFileStore {
    async fn load_theme(&self) -> Result<Option<ThemePref>, StorageError> {
        let Some(raw) = self.read_key(THEME_KEY)? else {
            return Ok(None);
        };
        let value: String =
            serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        Ok(Some(ThemePref::from_stored(&value)))
    }

    async fn save_theme(&self, theme: ThemePref) -> Result<(), StorageError> {
        let raw = serde_json::to_string(theme.as_str())
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.write_key(THEME_KEY, &raw)
    }
}

impl Storage {
    /// Build storage backed by JSON files under `dir`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn json_file(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let store = JsonFileStore::open(dir)?;
        Ok(Self {
            progress: std::sync::Arc::new(store.clone()),
            prefs: std::sync::Arc::new(store),
        })
    }
}
