use std::future::Future;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use url::Url;

use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::recipes_store::RecipesStore;

pub const QUERY_PARAM: &str = "q";

pub fn query_param(location: &Url) -> String {
    location
        .query_pairs()
        .find(|(key, _)| key == QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

pub fn sync_query_param(location: &mut Url, q: &str) {
    let others: Vec<(String, String)> = location
        .query_pairs()
        .filter(|(key, _)| key != QUERY_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    location.set_query(None);
    if others.is_empty() && q.is_empty() {
        return;
    }
    let mut pairs = location.query_pairs_mut();
    pairs.extend_pairs(others);
    if !q.is_empty() {
        pairs.append_pair(QUERY_PARAM, q);
    }
}

pub struct SearchSession {
    store: Arc<RecipesStore>,
    draft: Mutex<String>,
    location: Mutex<Url>,
    debouncer: Debouncer,
}

impl SearchSession {
    pub fn new(store: Arc<RecipesStore>, location: Url) -> Arc<Self> {
        Self::with_delay(store, location, SEARCH_DEBOUNCE)
    }

    pub fn with_delay(store: Arc<RecipesStore>, location: Url, delay: Duration) -> Arc<Self> {
        let draft = query_param(&location);
        Arc::new(SearchSession {
            store,
            draft: Mutex::new(draft),
            location: Mutex::new(location),
            debouncer: Debouncer::new(delay),
        })
    }

    pub fn store(&self) -> &Arc<RecipesStore> {
        &self.store
    }

    pub fn draft(&self) -> String {
        self.draft
            .lock()
            .map(|draft| draft.clone())
            .unwrap_or_default()
    }

    pub fn location(&self) -> Url {
        self.location
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub async fn open(&self) {
        let q = query_param(&self.location());
        if !q.is_empty() {
            self.store.search(&q).await;
        }
    }

    pub fn input(self: &Arc<Self>, q: &str) {
        self.input_then(q, |_| async {});
    }

    // Like `input`, then runs `after` once this input is committed. Nothing
    // runs for input superseded within the quiet period.
    pub fn input_then<F, Fut>(self: &Arc<Self>, q: &str, after: F)
    where
        F: FnOnce(Arc<SearchSession>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if let Ok(mut draft) = self.draft.lock() {
            *draft = q.to_string();
        }
        let session: Weak<SearchSession> = Arc::downgrade(self);
        let q = q.to_string();
        self.debouncer.schedule(async move {
            let Some(session) = session.upgrade() else {
                return;
            };
            session.commit(&q).await;
            after(session).await;
        });
    }

    pub async fn commit(&self, q: &str) {
        {
            let mut location = self
                .location
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            sync_query_param(&mut location, q);
        }
        log::debug!("Committed search '{}'", q);
        self.store.search(q).await;
    }
}
