use std::collections::BTreeMap;
use std::fmt;

use crate::recipe::{Difficulty, NewRecipe, RecipeTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Description,
    ImageUrl,
    Ingredients,
    Instructions,
    PrepTime,
    CookTime,
    Servings,
    Tags,
    Difficulty,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::ImageUrl => "imageUrl",
            Field::Ingredients => "ingredients",
            Field::Instructions => "instructions",
            Field::PrepTime => "prepTime",
            Field::CookTime => "cookTime",
            Field::Servings => "servings",
            Field::Tags => "tags",
            Field::Difficulty => "difficulty",
        }
    }

    fn from_key(key: &str) -> Option<Field> {
        let key: String = key
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "title" | "name" => Some(Field::Title),
            "description" => Some(Field::Description),
            "image" | "imageurl" => Some(Field::ImageUrl),
            "ingredients" => Some(Field::Ingredients),
            "instructions" | "steps" => Some(Field::Instructions),
            "prep" | "preptime" => Some(Field::PrepTime),
            "cook" | "cooktime" => Some(Field::CookTime),
            "servings" | "serves" => Some(Field::Servings),
            "tags" => Some(Field::Tags),
            "difficulty" => Some(Field::Difficulty),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub errors: BTreeMap<Field, String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeForm {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: String,
    pub tags: Vec<String>,
    pub difficulty: String,
}

impl Default for RecipeForm {
    fn default() -> Self {
        RecipeForm {
            title: String::new(),
            description: String::new(),
            image_url: String::new(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            prep_time: String::new(),
            cook_time: String::new(),
            servings: String::new(),
            tags: Vec::new(),
            difficulty: Difficulty::Easy.as_str().to_string(),
        }
    }
}

pub fn parse_list_input(raw: &str) -> Vec<String> {
    raw.split('\n')
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn non_blank(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_url_like(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with('/')
}

fn minutes(n: f64) -> Option<String> {
    (n > 0.0).then(|| format!("{} min", n))
}

pub fn validate(form: &RecipeForm) -> Validation {
    let mut errors = BTreeMap::new();

    let title = form.title.trim().chars().count();
    if title == 0 {
        errors.insert(Field::Title, "Title is required.".to_string());
    } else if title < 3 {
        errors.insert(Field::Title, "Title must be at least 3 characters.".to_string());
    } else if title > 120 {
        errors.insert(Field::Title, "Title must be under 120 characters.".to_string());
    }

    let description = form.description.trim().chars().count();
    if description == 0 {
        errors.insert(Field::Description, "Description is required.".to_string());
    } else if description < 10 {
        errors.insert(
            Field::Description,
            "Description must be at least 10 characters.".to_string(),
        );
    }

    let image_url = form.image_url.trim();
    if !image_url.is_empty() && !is_url_like(image_url) {
        errors.insert(
            Field::ImageUrl,
            "Provide a valid URL (http(s):// or /path).".to_string(),
        );
    }

    if non_blank(&form.ingredients).is_empty() {
        errors.insert(
            Field::Ingredients,
            "At least one ingredient is required.".to_string(),
        );
    }
    if non_blank(&form.instructions).is_empty() {
        errors.insert(
            Field::Instructions,
            "At least one instruction step is required.".to_string(),
        );
    }

    if !matches!(parse_number(&form.prep_time), Some(n) if n >= 0.0) {
        errors.insert(
            Field::PrepTime,
            "Prep time must be a non-negative number.".to_string(),
        );
    }
    if !matches!(parse_number(&form.cook_time), Some(n) if n >= 0.0) {
        errors.insert(
            Field::CookTime,
            "Cook time must be a non-negative number.".to_string(),
        );
    }
    if !matches!(parse_number(&form.servings), Some(n) if n > 0.0) {
        errors.insert(
            Field::Servings,
            "Servings must be a positive number.".to_string(),
        );
    }

    let difficulty = form.difficulty.trim();
    if !difficulty.is_empty() && difficulty.parse::<Difficulty>().is_err() {
        errors.insert(
            Field::Difficulty,
            "Difficulty must be one of: easy, medium, hard.".to_string(),
        );
    }

    Validation { errors }
}

impl RecipeForm {
    // Read a submission written as `field: value` lines. Lines that do not
    // start with a known field continue the previous one, so list fields may
    // span several lines.
    pub fn parse_message(text: &str) -> RecipeForm {
        let mut raw: BTreeMap<Field, String> = BTreeMap::new();
        let mut current: Option<Field> = None;
        for line in text.lines() {
            let field = line
                .split_once(':')
                .and_then(|(key, value)| Field::from_key(key).map(|f| (f, value)));
            match (field, current) {
                (Some((field, value)), _) => {
                    raw.insert(field, value.trim().to_string());
                    current = Some(field);
                }
                (None, Some(field)) => {
                    let entry = raw.entry(field).or_default();
                    entry.push('\n');
                    entry.push_str(line.trim());
                }
                (None, None) => {}
            }
        }

        let mut take = |field: Field| raw.remove(&field).unwrap_or_default();
        let mut form = RecipeForm {
            title: take(Field::Title),
            description: take(Field::Description).trim().to_string(),
            image_url: take(Field::ImageUrl),
            ingredients: parse_list_input(&take(Field::Ingredients)),
            instructions: parse_list_input(&take(Field::Instructions)),
            prep_time: take(Field::PrepTime),
            cook_time: take(Field::CookTime),
            servings: take(Field::Servings),
            tags: parse_list_input(&take(Field::Tags)),
            difficulty: take(Field::Difficulty).trim().to_lowercase(),
        };
        if form.difficulty.is_empty() {
            form.difficulty = Difficulty::Easy.as_str().to_string();
        }
        form
    }

    pub fn to_payload(&self) -> NewRecipe {
        let prep = parse_number(&self.prep_time).filter(|n| *n >= 0.0);
        let cook = parse_number(&self.cook_time).filter(|n| *n >= 0.0);
        let servings = parse_number(&self.servings).filter(|n| *n > 0.0);
        let image_url = self.image_url.trim();

        NewRecipe {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            image_url: (!image_url.is_empty()).then(|| image_url.to_string()),
            ingredients: non_blank(&self.ingredients),
            instructions: non_blank(&self.instructions),
            time: Some(RecipeTime {
                prep: prep.and_then(minutes),
                cook: cook.and_then(minutes),
                total: minutes(prep.unwrap_or(0.0) + cook.unwrap_or(0.0)),
            }),
            prep_time: prep.unwrap_or(0.0),
            cook_time: cook.unwrap_or(0.0),
            servings: servings.map(|n| n.round().max(1.0) as u32).unwrap_or(1),
            tags: non_blank(&self.tags)
                .into_iter()
                .map(|tag| tag.trim_start_matches('#').to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            difficulty: self.difficulty.trim().parse().ok(),
        }
    }
}
