#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use recipe_hub::db::LocalStorage;
use recipe_hub::{Error, NewRecipe, Recipe, RecipeId, RecipesService, Result};

pub fn recipe(id: RecipeId, title: &str) -> Recipe {
    let mut new = NewRecipe::titled(title);
    new.description = format!("{} description", title);
    Recipe::from_new(id, new)
}

// A service whose responses are queued by the test. Each queued list
// response may carry a delay so calls can complete out of order.
#[derive(Default)]
pub struct FakeService {
    lists: Mutex<VecDeque<(Duration, Result<Vec<Recipe>>)>>,
    pub records: Mutex<Vec<Recipe>>,
    pub offline: Mutex<bool>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeService {
    pub fn push_list(&self, delay: Duration, response: Result<Vec<Recipe>>) {
        self.lists.lock().unwrap().push_back((delay, response));
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecipesService for FakeService {
    async fn list(&self, query: &str) -> Result<Vec<Recipe>> {
        self.calls.lock().unwrap().push(query.to_string());
        let next = self.lists.lock().unwrap().pop_front();
        match next {
            Some((delay, response)) => {
                tokio::time::sleep(delay).await;
                response
            }
            None => Ok(Vec::new()),
        }
    }

    async fn get_by_id(&self, id: RecipeId) -> Result<Recipe> {
        if *self.offline.lock().unwrap() {
            return Err(Error::Request {
                status: 503,
                message: "Request failed with 503".to_string(),
                body: None,
            });
        }
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Recipe not found".to_string()))
    }

    async fn create(&self, payload: &NewRecipe) -> Result<Recipe> {
        Ok(Recipe::from_new(100, payload.clone()))
    }
}

// Storage whose every operation fails.
pub struct BrokenStorage;

impl LocalStorage for BrokenStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::Config("disk unavailable".to_string()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Err(Error::Config("disk unavailable".to_string()))
    }

    fn remove_item(&self, _key: &str) -> Result<()> {
        Err(Error::Config("disk unavailable".to_string()))
    }
}
