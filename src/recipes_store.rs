use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::Error;
use crate::recipe::Recipe;
use crate::service::RecipesService;

const FETCH_FAILED: &str = "Failed to load recipes";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub q: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipesState {
    pub recipes: Vec<Recipe>,
    pub filters: SearchFilters,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct RecipesStore {
    service: Arc<dyn RecipesService>,
    state: watch::Sender<RecipesState>,
    generation: AtomicU64,
    started: AtomicBool,
}

// Clears `loading` when the fetch that set it finishes, even if the fetch
// future is dropped before completing.
struct LoadingGuard<'a> {
    store: &'a RecipesStore,
    generation: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.store.is_current(self.generation) {
            self.store.state.send_if_modified(|state| {
                let was_loading = state.loading;
                state.loading = false;
                was_loading
            });
        }
    }
}

pub fn error_message(err: &Error) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        FETCH_FAILED.to_string()
    } else {
        message
    }
}

impl RecipesStore {
    pub fn new(service: Arc<dyn RecipesService>) -> Self {
        let (state, _) = watch::channel(RecipesState::default());
        RecipesStore {
            service,
            state,
            generation: AtomicU64::new(0),
            started: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RecipesState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RecipesState {
        self.state.borrow().clone()
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.state.borrow().recipes.clone()
    }

    pub async fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        self.fetch("").await;
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    // Load recipes for `query`. On failure the previous collection is kept
    // and `error` is set. Only the most recently issued fetch may update
    // state; older responses are dropped.
    pub async fn fetch(&self, query: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
        let _guard = LoadingGuard {
            store: self,
            generation,
        };

        log::debug!("Fetching recipes for query '{}'", query);
        let result = self.service.list(query).await;
        if !self.is_current(generation) {
            log::debug!("Dropping stale recipe response for query '{}'", query);
            return;
        }
        self.state.send_modify(|state| match result {
            Ok(recipes) => {
                log::debug!("Loaded {} recipes", recipes.len());
                state.recipes = recipes;
            }
            Err(e) => {
                log::warn!("Failed to load recipes: {}", e);
                state.error = Some(error_message(&e));
            }
        });
    }

    pub fn set_query(&self, q: &str) {
        self.state.send_if_modified(|state| {
            if state.filters.q == q {
                return false;
            }
            state.filters.q = q.to_string();
            true
        });
    }

    pub async fn search(&self, q: &str) {
        self.set_query(q);
        self.fetch(q).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRecipesApi;
    use std::time::Duration;

    fn store() -> RecipesStore {
        let api = MockRecipesApi::with_sample(Duration::from_millis(250)).unwrap();
        RecipesStore::new(Arc::new(api))
    }

    #[tokio::test(start_paused = true)]
    async fn start_fetches_once() {
        let store = store();
        store.start().await;
        assert_eq!(store.recipes().len(), 7);

        store.search("salmon").await;
        store.start().await;
        assert_eq!(store.recipes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn set_query_does_not_fetch() {
        let store = store();
        store.set_query("curry");
        let state = store.snapshot();
        assert_eq!(state.filters.q, "curry");
        assert!(state.recipes.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn loading_is_visible_while_in_flight() {
        let store = Arc::new(store());
        let mut rx = store.subscribe();
        let task = {
            let store = store.clone();
            tokio::spawn(async move { store.search("toast").await })
        };
        rx.wait_for(|s| s.loading).await.unwrap();
        task.await.unwrap();
        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.filters.q, "toast");
        assert_eq!(state.recipes.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_fetch_clears_loading() {
        let store = store();
        let fetch = store.fetch("");
        let _ = tokio::time::timeout(Duration::from_millis(10), fetch).await;
        assert!(!store.snapshot().loading);
    }

    #[test]
    fn blank_messages_fall_back() {
        assert_eq!(error_message(&Error::NotFound(String::new())), FETCH_FAILED);
        assert_eq!(error_message(&Error::NotFound("gone".into())), "gone");
    }
}
