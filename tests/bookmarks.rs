mod common;

use std::sync::Arc;

use common::{recipe, BrokenStorage, FakeService};
use recipe_hub::bookmarks::BOOKMARKS_KEY;
use recipe_hub::db::{LocalStorage, MemoryStorage, SqliteStorage};
use recipe_hub::bookmarks::BookmarkChange;
use recipe_hub::{BookmarkDetails, BookmarkEntry, BookmarksStore, Error};

fn store_with(storage: Arc<dyn LocalStorage>) -> (Arc<FakeService>, BookmarksStore) {
    let service = Arc::new(FakeService::default());
    let store = BookmarksStore::new(service.clone(), storage);
    (service, store)
}

#[test]
fn add_is_idempotent_and_persisted() {
    let storage = Arc::new(MemoryStorage::new());
    let (_, store) = store_with(storage.clone());

    store.add(&recipe(5, "Curry"));
    store.add(&recipe(5, "Curry again"));
    assert!(store.is_bookmarked(5));
    assert_eq!(store.bookmarks().len(), 1);
    assert_eq!(store.bookmarks()[0].title, "Curry");

    let raw = storage.get_item(BOOKMARKS_KEY).unwrap().unwrap();
    let persisted: Vec<BookmarkEntry> = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted, store.bookmarks());

    store.remove(5);
    assert!(!store.is_bookmarked(5));
    assert_eq!(storage.get_item(BOOKMARKS_KEY).unwrap().as_deref(), Some("[]"));
}

#[test]
fn remove_missing_is_a_no_op() {
    let (_, store) = store_with(Arc::new(MemoryStorage::new()));
    store.add(&recipe(1, "Soup"));
    store.remove(42);
    assert_eq!(store.bookmarks().len(), 1);
}

#[test]
fn double_toggle_restores_state() {
    let (_, store) = store_with(Arc::new(MemoryStorage::new()));
    store.add(&recipe(1, "Soup"));
    let before = store.bookmarks();

    assert!(store.toggle(&recipe(2, "Salad")));
    assert!(store.is_bookmarked(2));
    assert!(!store.toggle(&recipe(2, "Salad")));
    assert_eq!(store.bookmarks(), before);
}

#[test]
fn keeps_insertion_order() {
    let (_, store) = store_with(Arc::new(MemoryStorage::new()));
    for (id, title) in [(3, "C"), (1, "A"), (2, "B")] {
        store.add(&recipe(id, title));
    }
    let ids: Vec<u64> = store.bookmarks().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn reloads_from_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.db");
    {
        let (_, store) = store_with(Arc::new(SqliteStorage::open(&path).unwrap()));
        store.add(&recipe(7, "Ribs"));
    }
    let (_, store) = store_with(Arc::new(SqliteStorage::open(&path).unwrap()));
    assert!(store.is_bookmarked(7));
    assert_eq!(store.bookmarks()[0].description, "Ribs description");
}

#[test]
fn corrupt_or_unreadable_storage_starts_empty() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set_item(BOOKMARKS_KEY, "{not json").unwrap();
    let (_, store) = store_with(storage);
    assert!(store.bookmarks().is_empty());

    let (_, store) = store_with(Arc::new(BrokenStorage));
    assert!(store.bookmarks().is_empty());
}

#[test]
fn write_failures_are_swallowed() {
    let (_, store) = store_with(Arc::new(BrokenStorage));
    store.add(&recipe(1, "Soup"));
    assert!(store.is_bookmarked(1));
    store.toggle(&recipe(1, "Soup"));
    assert!(!store.is_bookmarked(1));
}

#[tokio::test]
async fn details_prefer_fresh_record() {
    let (service, store) = store_with(Arc::new(MemoryStorage::new()));
    let mut fresh = recipe(4, "Margherita");
    fresh.ingredients = vec!["dough".to_string()];
    service.records.lock().unwrap().push(fresh.clone());
    store.add(&recipe(4, "Old title"));

    assert_eq!(store.get_details(4).await, Some(BookmarkDetails::Full(fresh)));
}

#[tokio::test]
async fn details_fall_back_to_cached_summary() {
    let (service, store) = store_with(Arc::new(MemoryStorage::new()));
    store.add(&recipe(4, "Margherita"));
    service.set_offline(true);

    let details = store.get_details(4).await.unwrap();
    assert!(matches!(details, BookmarkDetails::Cached(_)));
    assert_eq!(details.title(), "Margherita");
    assert_eq!(details.description(), "Margherita description");

    assert_eq!(store.get_details(99).await, None);
}

#[tokio::test]
async fn toggle_by_id_uses_loaded_records_first() {
    let (service, store) = store_with(Arc::new(MemoryStorage::new()));
    service.set_offline(true);
    let loaded = vec![recipe(3, "Bowl")];

    let added = store.toggle_id(3, &loaded).await.unwrap();
    assert_eq!(added, BookmarkChange::Added(recipe(3, "Bowl").to_bookmark()));
    assert!(store.is_bookmarked(3));
}

#[tokio::test]
async fn toggle_by_id_fetches_unloaded_records() {
    let (service, store) = store_with(Arc::new(MemoryStorage::new()));
    service.records.lock().unwrap().push(recipe(6, "Smoothie"));

    assert!(matches!(
        store.toggle_id(6, &[]).await.unwrap(),
        BookmarkChange::Added(_)
    ));
    assert!(matches!(
        store.toggle_id(6, &[]).await.unwrap(),
        BookmarkChange::Removed(_)
    ));
    assert!(!store.is_bookmarked(6));
}

#[tokio::test]
async fn saved_bookmark_is_removed_while_offline() {
    let (service, store) = store_with(Arc::new(MemoryStorage::new()));
    store.add(&recipe(4, "Margherita"));
    service.set_offline(true);

    let change = store.toggle_id(4, &[]).await.unwrap();
    assert_eq!(change, BookmarkChange::Removed(recipe(4, "Margherita").to_bookmark()));
    assert!(!store.is_bookmarked(4));
}

#[tokio::test]
async fn unknown_recipe_cannot_be_bookmarked_offline() {
    let (service, store) = store_with(Arc::new(MemoryStorage::new()));
    service.set_offline(true);

    let err = store.toggle_id(9, &[]).await.unwrap_err();
    assert!(matches!(err, Error::Request { status: 503, .. }));
    assert!(store.bookmarks().is_empty());

    service.set_offline(false);
    let err = store.toggle_id(9, &[]).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
