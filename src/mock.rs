use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::recipe::{NewRecipe, Recipe, RecipeId};
use crate::service::RecipesService;

const SAMPLE: &str = include_str!("../assets/recipes.sample.json");

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(250);

struct Collection {
    items: Vec<Recipe>,
    next_id: RecipeId,
}

pub struct MockRecipesApi {
    latency: Duration,
    collection: Mutex<Collection>,
}

impl MockRecipesApi {
    pub fn new(items: Vec<Recipe>, latency: Duration) -> Self {
        let next_id = items.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        MockRecipesApi {
            latency,
            collection: Mutex::new(Collection { items, next_id }),
        }
    }

    pub fn with_sample(latency: Duration) -> Result<Self> {
        let items: Vec<Recipe> = serde_json::from_str(SAMPLE)?;
        log::debug!("Loaded {} sample recipes", items.len());
        Ok(Self::new(items, latency))
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn collection(&self) -> std::sync::MutexGuard<'_, Collection> {
        self.collection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecipesService for MockRecipesApi {
    async fn list(&self, query: &str) -> Result<Vec<Recipe>> {
        self.delay().await;
        let q = query.trim().to_lowercase();
        let collection = self.collection();
        if q.is_empty() {
            return Ok(collection.items.clone());
        }
        Ok(collection
            .items
            .iter()
            .filter(|r| {
                r.title.to_lowercase().contains(&q) || r.description.to_lowercase().contains(&q)
            })
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: RecipeId) -> Result<Recipe> {
        self.delay().await;
        self.collection()
            .items
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Recipe not found".to_string()))
    }

    async fn create(&self, payload: &NewRecipe) -> Result<Recipe> {
        self.delay().await;
        if payload.title.is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }
        let mut collection = self.collection();
        let id = collection.next_id;
        collection.next_id += 1;
        let recipe = Recipe::from_new(id, payload.clone());
        collection.items.insert(0, recipe.clone());
        log::debug!("Created mock recipe {} ({})", recipe.id, recipe.title);
        Ok(recipe)
    }
}
