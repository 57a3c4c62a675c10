use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safety_core::model::{Badge, ModuleKind, UserProgress};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key under which the serialized progress blob lives. Present iff the user
/// has registered.
pub const PROGRESS_KEY: &str = "safetyHero_data";

/// Key under which the theme preference string lives.
pub const THEME_KEY: &str = "safetyHero_theme";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// A stored blob exists but cannot be decoded. Callers recover by
    /// discarding it and reinitializing to the zero-value default.
    #[error("corrupt stored state: {0}")]
    Corrupt(String),

    #[error("i/o error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── PERSISTED SHAPES ──────────────────────────────────────────────────────────
//

/// Persisted shape for a badge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeRecord {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
}

impl BadgeRecord {
    #[must_use]
    pub fn from_badge(badge: &Badge) -> Self {
        Self {
            id: badge.id().to_owned(),
            name: badge.name().to_owned(),
            icon: badge.icon().to_owned(),
            description: badge.description().to_owned(),
            earned_at: badge.earned_at(),
        }
    }

    #[must_use]
    pub fn into_badge(self) -> Badge {
        Badge::from_persisted(self.id, self.name, self.icon, self.description, self.earned_at)
    }
}

/// Persisted shape for user progress.
///
/// Mirrors the domain `UserProgress` so stores can serialize without leaking
/// storage concerns into the domain layer. Decoding is tolerant: unknown
/// fields are ignored and missing fields default, so older blobs keep
/// loading. The stored `level` is carried for the blob's readers but never
/// trusted on rehydrate; it is recomputed from `xp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub completed_modules: Vec<ModuleKind>,
    #[serde(default)]
    pub badges: Vec<BadgeRecord>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_progress(progress: &UserProgress) -> Self {
        Self {
            name: progress.name().to_owned(),
            xp: progress.xp(),
            level: progress.level(),
            completed_modules: progress.completed_modules().to_vec(),
            badges: progress.badges().iter().map(BadgeRecord::from_badge).collect(),
        }
    }

    /// Convert the record back into domain progress. Level is recomputed and
    /// duplicate module entries are dropped by the domain constructor.
    #[must_use]
    pub fn into_progress(self) -> UserProgress {
        let badges = self.badges.into_iter().map(BadgeRecord::into_badge).collect();
        UserProgress::from_persisted(self.name, self.xp, self.completed_modules, badges)
    }
}

//
// ─── THEME ─────────────────────────────────────────────────────────────────────
//

/// Persisted theme preference. Absent preference defaults to light.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemePref {
    #[default]
    Light,
    Dark,
}

impl ThemePref {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePref::Light => "light",
            ThemePref::Dark => "dark",
        }
    }

    /// Decodes the stored string; anything other than `"dark"` reads as
    /// light.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value == "dark" {
            ThemePref::Dark
        } else {
            ThemePref::Light
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            ThemePref::Light => ThemePref::Dark,
            ThemePref::Dark => ThemePref::Light,
        }
    }
}

//
// ─── REPOSITORIES ──────────────────────────────────────────────────────────────
//

/// Store contract for the progress blob.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the stored progress record, `None` if nothing is stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupt` if a blob exists but cannot be
    /// decoded, or other storage errors.
    async fn load_progress(&self) -> Result<Option<ProgressRecord>, StorageError>;

    /// Persist or replace the progress record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;

    /// Remove the stored progress record, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn clear_progress(&self) -> Result<(), StorageError>;
}

/// Store contract for user preferences.
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// Fetch the stored theme preference, `None` if never set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn load_theme(&self) -> Result<Option<ThemePref>, StorageError>;

    /// Persist the theme preference.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the preference cannot be stored.
    async fn save_theme(&self, theme: ThemePref) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY STORE ───────────────────────────────────────────────────────────
//

/// Simple in-memory key-value store for testing and prototyping.
///
/// Values are raw JSON strings keyed like the host's local storage, so tests
/// can seed malformed blobs to exercise the corrupt-state path.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing serialization.
    pub fn insert_raw(&self, key: &str, value: &str) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.insert(key.to_string(), value.to_string());
        }
    }

    /// Read back a raw value.
    #[must_use]
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        guard.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryStore {
    async fn load_progress(&self) -> Result<Option<ProgressRecord>, StorageError> {
        let Some(raw) = self.read(PROGRESS_KEY)? else {
            return Ok(None);
        };
        let record =
            serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        Ok(Some(record))
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let raw = serde_json::to_string(record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.write(PROGRESS_KEY, raw)
    }

    async fn clear_progress(&self) -> Result<(), StorageError> {
        self.remove(PROGRESS_KEY)
    }
}

#[async_trait]
impl PreferenceRepository for InMemoryStore {
    async fn load_theme(&self) -> Result<Option<ThemePref>, StorageError> {
        Ok(self.read(THEME_KEY)?.map(|raw| ThemePref::from_stored(&raw)))
    }

    async fn save_theme(&self, theme: ThemePref) -> Result<(), StorageError> {
        self.write(THEME_KEY, theme.as_str().to_string())
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates the blob repositories behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub prefs: Arc<dyn PreferenceRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let store = InMemoryStore::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(store.clone());
        let prefs: Arc<dyn PreferenceRepository> = Arc::new(store);
        Self { progress, prefs }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
