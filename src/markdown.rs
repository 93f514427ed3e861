use url::Url;

use crate::recipe::{Recipe, RecipeId};
use crate::recipes_store::RecipesState;
use crate::validation::Validation;

pub const MAX_RESULTS: usize = 10;

static SPECIAL_CHARACTERS: [char; 19] = [
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    '\\',
];

pub fn escape_markdown(str: &str) -> String {
    let mut new_str = String::new();
    for c in str.chars() {
        if SPECIAL_CHARACTERS.contains(&c) {
            new_str.push('\\');
        }
        new_str.push(c)
    }
    new_str
}

pub fn format_summary(id: RecipeId, title: &str, description: &str) -> String {
    format!(
        "*{}* \\(/recipe {}\\)\n{}",
        escape_markdown(title),
        id,
        escape_markdown(description)
    )
}

pub fn format_recipe(recipe: &Recipe) -> String {
    let mut text = format!(
        "*{}*\n{}\n\n",
        escape_markdown(&recipe.title),
        escape_markdown(&recipe.description)
    );
    let mut facts = vec![
        format!("prep {} min", recipe.prep_time),
        format!("cook {} min", recipe.cook_time),
        format!("serves {}", recipe.servings),
    ];
    if let Some(difficulty) = recipe.difficulty {
        facts.push(difficulty.to_string());
    }
    text.push_str(&escape_markdown(&facts.join(" · ")));
    text.push_str("\n\n*Ingredients*\n");
    for ingredient in &recipe.ingredients {
        text.push_str(&format!("• {}\n", escape_markdown(ingredient)));
    }
    text.push_str("\n*Instructions*\n");
    for (i, step) in recipe.instructions.iter().enumerate() {
        text.push_str(&format!("{}\\. {}\n", i + 1, escape_markdown(step)));
    }
    if !recipe.tags.is_empty() {
        let tags: Vec<String> = recipe.tags.iter().map(|t| format!("#{}", t)).collect();
        text.push_str(&format!("\n{}", escape_markdown(&tags.join(" "))));
    }
    text
}

pub fn format_results(state: &RecipesState, link: Option<&Url>) -> String {
    if let Some(error) = &state.error {
        return escape_markdown(error);
    }
    let mut text = if state.recipes.is_empty() {
        escape_markdown(&format!("No recipes found for '{}'.", state.filters.q))
    } else {
        state
            .recipes
            .iter()
            .take(MAX_RESULTS)
            .map(|r| format_summary(r.id, &r.title, &r.description))
            .collect::<Vec<_>>()
            .join("\n\n")
    };
    if state.recipes.len() > MAX_RESULTS {
        text.push_str(&escape_markdown(&format!(
            "\n\n...and {} more",
            state.recipes.len() - MAX_RESULTS
        )));
    }
    if let Some(link) = link {
        text.push_str(&format!("\n\n{}", escape_markdown(link.as_str())));
    }
    text
}

pub fn format_validation_errors(validation: &Validation) -> String {
    let mut text = String::from("Please fix the following and try again:\n");
    for (field, error) in &validation.errors {
        text.push_str(&format!("\n{}: {}", field, error));
    }
    escape_markdown(&text)
}
