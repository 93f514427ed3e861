use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub type RecipeId = u64;

pub fn parse_id(raw: &str) -> Result<RecipeId, Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::Validation("id is required".to_string()));
    }
    raw.parse::<RecipeId>()
        .map_err(|_| Error::Validation(format!("'{}' is not a valid recipe id", raw)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<RecipeTime>,
    #[serde(default)]
    pub prep_time: f64,
    #[serde(default)]
    pub cook_time: f64,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

fn default_servings() -> u32 {
    1
}

impl Recipe {
    pub fn from_new(id: RecipeId, new: NewRecipe) -> Self {
        Recipe {
            id,
            title: new.title,
            description: new.description,
            image_url: new.image_url.filter(|url| !url.is_empty()),
            ingredients: new.ingredients,
            instructions: new.instructions,
            time: new.time,
            prep_time: new.prep_time,
            cook_time: new.cook_time,
            servings: new.servings,
            tags: new.tags,
            difficulty: new.difficulty,
        }
    }

    pub fn to_bookmark(&self) -> BookmarkEntry {
        BookmarkEntry {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<RecipeTime>,
    #[serde(default)]
    pub prep_time: f64,
    #[serde(default)]
    pub cook_time: f64,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl NewRecipe {
    pub fn titled(title: impl Into<String>) -> Self {
        NewRecipe {
            title: title.into(),
            description: String::new(),
            image_url: None,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            time: None,
            prep_time: 0.0,
            cook_time: 0.0,
            servings: 1,
            tags: Vec::new(),
            difficulty: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkEntry {
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl From<&Recipe> for BookmarkEntry {
    fn from(recipe: &Recipe) -> Self {
        recipe.to_bookmark()
    }
}
