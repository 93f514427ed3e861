use std::sync::Arc;
use tokio::sync::watch;

use crate::db::LocalStorage;
use crate::error::Result;
use crate::recipe::{BookmarkEntry, Recipe, RecipeId};
use crate::service::RecipesService;

pub const BOOKMARKS_KEY: &str = "recipe_hub_bookmarks_v1";

#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkDetails {
    Full(Recipe),
    Cached(BookmarkEntry),
}

impl BookmarkDetails {
    pub fn title(&self) -> &str {
        match self {
            BookmarkDetails::Full(recipe) => &recipe.title,
            BookmarkDetails::Cached(entry) => &entry.title,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            BookmarkDetails::Full(recipe) => &recipe.description,
            BookmarkDetails::Cached(entry) => &entry.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkChange {
    Added(BookmarkEntry),
    Removed(BookmarkEntry),
}

pub struct BookmarksStore {
    service: Arc<dyn RecipesService>,
    storage: Arc<dyn LocalStorage>,
    state: watch::Sender<Vec<BookmarkEntry>>,
}

fn load(storage: &dyn LocalStorage) -> Vec<BookmarkEntry> {
    match storage.get_item(BOOKMARKS_KEY) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Ignoring corrupt bookmarks: {}", e);
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            log::warn!("Could not read bookmarks: {}", e);
            Vec::new()
        }
    }
}

impl BookmarksStore {
    pub fn new(service: Arc<dyn RecipesService>, storage: Arc<dyn LocalStorage>) -> Self {
        let entries = load(storage.as_ref());
        log::debug!("Loaded {} bookmarks", entries.len());
        let (state, _) = watch::channel(entries);
        BookmarksStore {
            service,
            storage,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<BookmarkEntry>> {
        self.state.subscribe()
    }

    pub fn bookmarks(&self) -> Vec<BookmarkEntry> {
        self.state.borrow().clone()
    }

    pub fn is_bookmarked(&self, id: RecipeId) -> bool {
        self.state.borrow().iter().any(|entry| entry.id == id)
    }

    pub fn add(&self, recipe: &Recipe) {
        self.update(|entries| {
            if entries.iter().any(|entry| entry.id == recipe.id) {
                return false;
            }
            entries.push(recipe.to_bookmark());
            true
        });
    }

    pub fn remove(&self, id: RecipeId) {
        self.update(|entries| {
            let before = entries.len();
            entries.retain(|entry| entry.id != id);
            entries.len() != before
        });
    }

    pub fn toggle(&self, recipe: &Recipe) -> bool {
        let mut added = false;
        self.update(|entries| {
            if entries.iter().any(|entry| entry.id == recipe.id) {
                entries.retain(|entry| entry.id != recipe.id);
            } else {
                entries.push(recipe.to_bookmark());
                added = true;
            }
            true
        });
        added
    }

    // Toggle by id, using an already loaded record when there is one. A saved
    // bookmark can still be removed while the service is failing.
    pub async fn toggle_id(&self, id: RecipeId, loaded: &[Recipe]) -> Result<BookmarkChange> {
        let found = match loaded.iter().find(|r| r.id == id) {
            Some(recipe) => Ok(recipe.clone()),
            None => self.service.get_by_id(id).await,
        };
        match found {
            Ok(recipe) => {
                let entry = recipe.to_bookmark();
                if self.toggle(&recipe) {
                    Ok(BookmarkChange::Added(entry))
                } else {
                    Ok(BookmarkChange::Removed(entry))
                }
            }
            Err(e) => {
                let cached = self.state.borrow().iter().find(|entry| entry.id == id).cloned();
                match cached {
                    Some(entry) => {
                        log::warn!("Removing bookmark {} without the service: {}", id, e);
                        self.remove(id);
                        Ok(BookmarkChange::Removed(entry))
                    }
                    None => Err(e),
                }
            }
        }
    }

    pub async fn get_details(&self, id: RecipeId) -> Option<BookmarkDetails> {
        match self.service.get_by_id(id).await {
            Ok(recipe) => Some(BookmarkDetails::Full(recipe)),
            Err(e) => {
                log::warn!("Falling back to cached bookmark {}: {}", id, e);
                self.state
                    .borrow()
                    .iter()
                    .find(|entry| entry.id == id)
                    .cloned()
                    .map(BookmarkDetails::Cached)
            }
        }
    }

    fn update<F>(&self, modify: F)
    where
        F: FnOnce(&mut Vec<BookmarkEntry>) -> bool,
    {
        if self.state.send_if_modified(modify) {
            self.persist();
        }
    }

    fn persist(&self) {
        let raw = match serde_json::to_string(&*self.state.borrow()) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Could not serialize bookmarks: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(BOOKMARKS_KEY, &raw) {
            log::warn!("Could not persist bookmarks: {}", e);
        }
    }
}
