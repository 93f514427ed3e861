use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::client::ApiClient;
use crate::env::EnvConfig;
use crate::error::{Error, Result};
use crate::mock::MockRecipesApi;
use crate::recipe::{NewRecipe, Recipe, RecipeId};

#[async_trait]
pub trait RecipesService: Send + Sync {
    async fn list(&self, query: &str) -> Result<Vec<Recipe>>;
    async fn get_by_id(&self, id: RecipeId) -> Result<Recipe>;
    async fn create(&self, payload: &NewRecipe) -> Result<Recipe>;
}

pub struct HttpRecipesApi {
    client: ApiClient,
}

impl HttpRecipesApi {
    pub fn new(client: ApiClient) -> Self {
        HttpRecipesApi { client }
    }
}

pub fn list_path(query: &str) -> String {
    if query.is_empty() {
        "/recipes".to_string()
    } else {
        let q: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        format!("/recipes?q={}", q)
    }
}

#[async_trait]
impl RecipesService for HttpRecipesApi {
    async fn list(&self, query: &str) -> Result<Vec<Recipe>> {
        match self.client.get(&list_path(query)).await? {
            Some(data @ Value::Array(_)) => Ok(serde_json::from_value(data)?),
            other => {
                log::debug!("Recipe list response was not a sequence: {:?}", other);
                Ok(Vec::new())
            }
        }
    }

    async fn get_by_id(&self, id: RecipeId) -> Result<Recipe> {
        let data = self.client.get(&format!("/recipes/{}", id)).await?;
        Ok(serde_json::from_value(data.unwrap_or(Value::Null))?)
    }

    async fn create(&self, payload: &NewRecipe) -> Result<Recipe> {
        if payload.title.is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }
        let data = self.client.post("/recipes", payload).await?;
        Ok(serde_json::from_value(data.unwrap_or(Value::Null))?)
    }
}

pub fn create_recipes_api(config: &EnvConfig) -> Result<Arc<dyn RecipesService>> {
    if config.use_mock {
        log::info!(
            "No API configured, using mock recipes with {:?} latency",
            config.mock_latency
        );
        return Ok(Arc::new(MockRecipesApi::with_sample(config.mock_latency)?));
    }
    let base = config.resolve_base_url();
    log::info!("Using recipes API at '{}'", base);
    Ok(Arc::new(HttpRecipesApi::new(ApiClient::new(base))))
}
