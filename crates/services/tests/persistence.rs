use std::sync::Arc;

use safety_core::model::{ModuleKind, UserProgress};
use safety_core::time::fixed_clock;
use services::{AppController, ProgressService};
use storage::repository::{InMemoryStore, PROGRESS_KEY, Storage, ThemePref};

fn storage_with(store: &InMemoryStore) -> Storage {
    Storage {
        progress: Arc::new(store.clone()),
        prefs: Arc::new(store.clone()),
    }
}

async fn launch(store: &InMemoryStore) -> AppController {
    let progress = ProgressService::load(fixed_clock(), &storage_with(store))
        .await
        .unwrap();
    AppController::new(progress)
}

#[tokio::test]
async fn progress_survives_relaunch() {
    let store = InMemoryStore::new();

    {
        let mut controller = launch(&store).await;
        controller.register("Sam").await.unwrap();
        let ticket = controller.start_module(ModuleKind::FallFromHeight).unwrap();
        let questions = services::fallback_questions(ticket.module());
        assert!(controller.resolve_questions(ticket, questions));
        assert!(controller.select_option("b"));
        assert!(controller.reveal_feedback());
        assert_eq!(controller.advance().await.unwrap(), Some(20));
    }

    let controller = launch(&store).await;
    assert_eq!(controller.screen(), services::Screen::Dashboard);
    assert_eq!(controller.progress().name(), "Sam");
    assert_eq!(controller.progress().xp(), 20);
    assert_eq!(controller.progress().badges().len(), 1);
    assert!(controller.progress().is_completed(ModuleKind::FallFromHeight));
}

#[tokio::test]
async fn stored_blob_uses_the_local_storage_shape() {
    let store = InMemoryStore::new();

    let mut controller = launch(&store).await;
    controller.register("Sam").await.unwrap();

    let raw = store.get_raw(PROGRESS_KEY).unwrap();
    assert!(raw.contains("\"name\":\"Sam\""));
    assert!(raw.contains("\"completedModules\""));
    assert!(raw.contains("\"badges\""));
}

#[tokio::test]
async fn corrupt_blob_relaunches_as_fresh_install() {
    let store = InMemoryStore::new();
    store.insert_raw(PROGRESS_KEY, "\u{1}garbage");

    let controller = launch(&store).await;
    assert_eq!(controller.screen(), services::Screen::Registration);
    assert_eq!(controller.progress(), &UserProgress::default());
}

#[tokio::test]
async fn logout_clears_progress_but_not_theme() {
    let store = InMemoryStore::new();

    let mut controller = launch(&store).await;
    controller.register("Sam").await.unwrap();
    controller.toggle_theme().await.unwrap();
    controller.logout().await.unwrap();
    assert_eq!(controller.screen(), services::Screen::Registration);

    let controller = launch(&store).await;
    assert_eq!(controller.screen(), services::Screen::Registration);
    assert_eq!(controller.theme(), ThemePref::Dark);
    assert!(store.get_raw(PROGRESS_KEY).is_none());
}
