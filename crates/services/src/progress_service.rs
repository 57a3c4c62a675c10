use std::sync::Arc;

use safety_core::Clock;
use safety_core::model::{ModuleKind, UserProgress};
use storage::repository::{
    PreferenceRepository, ProgressRecord, ProgressRepository, Storage, StorageError, ThemePref,
};

use crate::error::ProgressServiceError;

/// Persistence boundary around the pure progress operations.
///
/// Owns the live `UserProgress` plus the registered flag, and writes every
/// successful mutation through to storage while registered. Core stays pure;
/// all I/O happens here.
pub struct ProgressService {
    clock: Clock,
    progress: UserProgress,
    registered: bool,
    theme: ThemePref,
    store: Arc<dyn ProgressRepository>,
    prefs: Arc<dyn PreferenceRepository>,
}

impl ProgressService {
    /// Load state from storage, or start from the zero-value default.
    ///
    /// A corrupt progress blob is logged, cleared, and replaced with the
    /// default (unregistered) rather than propagated; an absent theme
    /// preference defaults to light.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` for storage failures other
    /// than a corrupt blob.
    pub async fn load(clock: Clock, storage: &Storage) -> Result<Self, ProgressServiceError> {
        let (progress, registered) = match storage.progress.load_progress().await {
            Ok(Some(record)) => (record.into_progress(), true),
            Ok(None) => (UserProgress::default(), false),
            Err(StorageError::Corrupt(reason)) => {
                tracing::warn!(%reason, "discarding corrupt progress blob");
                storage.progress.clear_progress().await?;
                (UserProgress::default(), false)
            }
            Err(err) => return Err(err.into()),
        };

        let theme = storage.prefs.load_theme().await?.unwrap_or_default();

        Ok(Self {
            clock,
            progress,
            registered,
            theme,
            store: Arc::clone(&storage.progress),
            prefs: Arc::clone(&storage.prefs),
        })
    }

    #[must_use]
    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    #[must_use]
    pub fn theme(&self) -> ThemePref {
        self.theme
    }

    /// Register the trainee under `name` and start persisting progress.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::EmptyName` for a blank name, or storage
    /// failures from the write-through.
    pub async fn register(&mut self, name: &str) -> Result<(), ProgressServiceError> {
        self.progress = self.progress.clone().with_name(name)?;
        self.registered = true;
        self.persist().await
    }

    /// Fold a completed quiz into progress; persists while registered.
    ///
    /// # Errors
    ///
    /// Returns storage failures from the write-through.
    pub async fn apply_completion(
        &mut self,
        module: ModuleKind,
        score: u32,
    ) -> Result<&UserProgress, ProgressServiceError> {
        self.progress =
            self.progress
                .clone()
                .apply_module_completion(module, score, self.clock.now());
        self.persist().await?;
        Ok(&self.progress)
    }

    /// Drop all progress and registered status. The theme preference is left
    /// in place.
    ///
    /// # Errors
    ///
    /// Returns storage failures from clearing the blob.
    pub async fn reset(&mut self) -> Result<(), ProgressServiceError> {
        self.progress = UserProgress::default();
        self.registered = false;
        self.store.clear_progress().await?;
        Ok(())
    }

    /// Flip and persist the theme preference.
    ///
    /// # Errors
    ///
    /// Returns storage failures from persisting the preference.
    pub async fn toggle_theme(&mut self) -> Result<ThemePref, ProgressServiceError> {
        self.theme = self.theme.toggled();
        self.prefs.save_theme(self.theme).await?;
        Ok(self.theme)
    }

    async fn persist(&self) -> Result<(), ProgressServiceError> {
        if self.registered {
            self.store
                .save_progress(&ProgressRecord::from_progress(&self.progress))
                .await?;
        }
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use safety_core::model::ProgressError;
    use safety_core::time::fixed_clock;
    use storage::repository::InMemoryStore;

    fn storage_with(store: &InMemoryStore) -> Storage {
        Storage {
            progress: Arc::new(store.clone()),
            prefs: Arc::new(store.clone()),
        }
    }

    #[tokio::test]
    async fn fresh_store_loads_unregistered_default() {
        let store = InMemoryStore::new();
        let service = ProgressService::load(fixed_clock(), &storage_with(&store))
            .await
            .unwrap();

        assert!(!service.is_registered());
        assert_eq!(service.progress(), &UserProgress::default());
        assert_eq!(service.theme(), ThemePref::Light);
    }

    #[tokio::test]
    async fn register_persists_and_reloads() {
        let store = InMemoryStore::new();
        let storage = storage_with(&store);

        let mut service = ProgressService::load(fixed_clock(), &storage).await.unwrap();
        service.register("Alex").await.unwrap();
        service
            .apply_completion(ModuleKind::FallFromHeight, 60)
            .await
            .unwrap();

        let reloaded = ProgressService::load(fixed_clock(), &storage).await.unwrap();
        assert!(reloaded.is_registered());
        assert_eq!(reloaded.progress().name(), "Alex");
        assert_eq!(reloaded.progress().xp(), 60);
        assert_eq!(reloaded.progress().badges().len(), 1);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let store = InMemoryStore::new();
        let mut service = ProgressService::load(fixed_clock(), &storage_with(&store))
            .await
            .unwrap();

        let err = service.register("   ").await.unwrap_err();
        assert!(matches!(
            err,
            ProgressServiceError::Progress(ProgressError::EmptyName)
        ));
        assert!(store.get_raw(storage::repository::PROGRESS_KEY).is_none());
    }

    #[tokio::test]
    async fn unregistered_completion_is_not_persisted() {
        let store = InMemoryStore::new();
        let mut service = ProgressService::load(fixed_clock(), &storage_with(&store))
            .await
            .unwrap();

        service
            .apply_completion(ModuleKind::ForkliftSafety, 40)
            .await
            .unwrap();

        assert_eq!(service.progress().xp(), 40);
        assert!(store.get_raw(storage::repository::PROGRESS_KEY).is_none());
    }

    #[tokio::test]
    async fn corrupt_blob_loads_as_default_and_clears() {
        let store = InMemoryStore::new();
        store.insert_raw(storage::repository::PROGRESS_KEY, "{definitely not json");

        let service = ProgressService::load(fixed_clock(), &storage_with(&store))
            .await
            .unwrap();

        assert!(!service.is_registered());
        assert_eq!(service.progress(), &UserProgress::default());
        assert!(store.get_raw(storage::repository::PROGRESS_KEY).is_none());
    }

    #[tokio::test]
    async fn reset_clears_progress_but_keeps_theme() {
        let store = InMemoryStore::new();
        let storage = storage_with(&store);

        let mut service = ProgressService::load(fixed_clock(), &storage).await.unwrap();
        service.register("Noa").await.unwrap();
        service.toggle_theme().await.unwrap();
        service.reset().await.unwrap();

        assert!(!service.is_registered());
        assert!(store.get_raw(storage::repository::PROGRESS_KEY).is_none());

        let reloaded = ProgressService::load(fixed_clock(), &storage).await.unwrap();
        assert_eq!(reloaded.theme(), ThemePref::Dark);
    }
}
