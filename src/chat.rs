use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

use crate::recipe::{Recipe, RecipeId};
use crate::recipes_store::RecipesStore;
use crate::search::SearchSession;
use crate::service::RecipesService;

pub const MAX_SESSIONS: usize = 1024;

struct Entry {
    session: Arc<SearchSession>,
    last_used: u64,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<i64, Entry>,
    clock: u64,
}

// One search session per chat, each with its own recipes store. Once full,
// the least recently used chat is dropped, which cancels its pending search.
pub struct ChatSessions {
    service: Arc<dyn RecipesService>,
    location: Url,
    capacity: usize,
    sessions: Mutex<Sessions>,
}

impl ChatSessions {
    pub fn new(service: Arc<dyn RecipesService>, location: Url) -> Self {
        Self::with_capacity(service, location, MAX_SESSIONS)
    }

    pub fn with_capacity(service: Arc<dyn RecipesService>, location: Url, capacity: usize) -> Self {
        ChatSessions {
            service,
            location,
            capacity: capacity.max(1),
            sessions: Mutex::new(Sessions::default()),
        }
    }

    pub fn session(&self, chat: i64) -> Arc<SearchSession> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.clock += 1;
        let now = sessions.clock;
        if let Some(entry) = sessions.entries.get_mut(&chat) {
            entry.last_used = now;
            return entry.session.clone();
        }
        if sessions.entries.len() >= self.capacity {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(chat, _)| *chat);
            if let Some(oldest) = oldest {
                log::debug!("Dropping search session for chat {}", oldest);
                sessions.entries.remove(&oldest);
            }
        }
        let store = Arc::new(RecipesStore::new(self.service.clone()));
        let session = SearchSession::new(store, self.location.clone());
        sessions.entries.insert(
            chat,
            Entry {
                session: session.clone(),
                last_used: now,
            },
        );
        session
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .map(|sessions| sessions.entries.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn pick_random<R: Rng + ?Sized>(
    recipes: &[Recipe],
    seen: &[RecipeId],
    rng: &mut R,
) -> Option<Recipe> {
    let candidates: Vec<&Recipe> = recipes.iter().filter(|r| !seen.contains(&r.id)).collect();
    candidates.choose(rng).map(|recipe| (*recipe).clone())
}
