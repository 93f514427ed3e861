pub mod bookmarks;
pub mod chat;
pub mod client;
pub mod db;
pub mod debounce;
pub mod env;
pub mod error;
pub mod markdown;
pub mod mock;
pub mod recipe;
pub mod recipes_store;
pub mod search;
pub mod service;
pub mod theme;
pub mod validation;

pub use bookmarks::{BookmarkChange, BookmarkDetails, BookmarksStore};
pub use error::{Error, Result};
pub use recipe::{BookmarkEntry, Difficulty, NewRecipe, Recipe, RecipeId};
pub use recipes_store::{RecipesState, RecipesStore};
pub use service::{create_recipes_api, RecipesService};
pub use theme::{Theme, ThemeStore};
