mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{recipe, FakeService};
use recipe_hub::mock::MockRecipesApi;
use recipe_hub::{Error, RecipesStore};

#[tokio::test(start_paused = true)]
async fn failed_fetch_keeps_last_collection() {
    let service = Arc::new(FakeService::default());
    service.push_list(Duration::ZERO, Ok(vec![recipe(1, "Soup"), recipe(2, "Salad")]));
    service.push_list(
        Duration::ZERO,
        Err(Error::Request {
            status: 500,
            message: "Request failed with 500".to_string(),
            body: None,
        }),
    );
    let store = RecipesStore::new(service.clone());

    store.start().await;
    assert_eq!(store.recipes().len(), 2);

    store.search("soup").await;
    let state = store.snapshot();
    assert_eq!(state.recipes.len(), 2);
    assert_eq!(state.error.as_deref(), Some("Request failed with 500"));
    assert!(!state.loading);
    assert_eq!(state.filters.q, "soup");
}

#[tokio::test(start_paused = true)]
async fn next_fetch_clears_error() {
    let service = Arc::new(FakeService::default());
    service.push_list(Duration::ZERO, Err(Error::NotFound("gone".to_string())));
    service.push_list(Duration::ZERO, Ok(vec![recipe(1, "Soup")]));
    let store = RecipesStore::new(service);

    store.fetch("").await;
    assert_eq!(store.snapshot().error.as_deref(), Some("gone"));
    store.fetch("").await;
    assert_eq!(store.snapshot().error, None);
    assert_eq!(store.recipes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn start_issues_exactly_one_unfiltered_fetch() {
    let service = Arc::new(FakeService::default());
    let store = RecipesStore::new(service.clone());
    store.start().await;
    store.start().await;
    assert_eq!(service.calls(), vec![String::new()]);
}

#[tokio::test(start_paused = true)]
async fn stale_response_is_dropped() {
    let service = Arc::new(FakeService::default());
    // The first request answers after the second one.
    service.push_list(Duration::from_millis(500), Ok(vec![recipe(1, "Stale")]));
    service.push_list(Duration::from_millis(100), Ok(vec![recipe(2, "Fresh")]));
    let store = Arc::new(RecipesStore::new(service.clone()));

    let slow = {
        let store = store.clone();
        tokio::spawn(async move { store.search("s").await })
    };
    tokio::task::yield_now().await;
    let fast = {
        let store = store.clone();
        tokio::spawn(async move { store.search("fr").await })
    };

    fast.await.unwrap();
    assert_eq!(store.recipes()[0].title, "Fresh");
    assert!(!store.snapshot().loading);

    slow.await.unwrap();
    let state = store.snapshot();
    assert_eq!(state.recipes[0].title, "Fresh");
    assert_eq!(state.filters.q, "fr");
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn empty_query_matches_unfiltered_listing() {
    let api = Arc::new(MockRecipesApi::with_sample(Duration::from_millis(250)).unwrap());
    let store = RecipesStore::new(api.clone());

    store.search("").await;
    let searched = store.recipes();
    store.start().await;
    assert_eq!(store.recipes(), searched);
    assert_eq!(searched.len(), 7);
}

#[tokio::test(start_paused = true)]
async fn subscribers_observe_results() {
    let service = Arc::new(FakeService::default());
    service.push_list(Duration::from_millis(50), Ok(vec![recipe(9, "Pie")]));
    let store = Arc::new(RecipesStore::new(service));
    let mut rx = store.subscribe();

    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.start().await })
    };
    let state = rx
        .wait_for(|s| !s.loading && !s.recipes.is_empty())
        .await
        .unwrap()
        .clone();
    assert_eq!(state.recipes[0].id, 9);
    task.await.unwrap();
}
