use dotenv::dotenv;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::*;
use teloxide::types::ParseMode;
use teloxide::{prelude::*, utils::command::BotCommands};
use url::Url;

use recipe_hub::chat::{pick_random, ChatSessions};
use recipe_hub::db::{LocalStorage, MemoryStorage, SqliteStorage};
use recipe_hub::env::{EnvConfig, Mode};
use recipe_hub::markdown::{
    escape_markdown, format_recipe, format_results, format_summary, format_validation_errors,
};
use recipe_hub::recipe::parse_id;
use recipe_hub::recipes_store::error_message;
use recipe_hub::validation::{validate, RecipeForm};
use recipe_hub::{
    create_recipes_api, BookmarkChange, BookmarkDetails, BookmarksStore, RecipeId,
    RecipesService, ThemeStore,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type MyDialogue = Dialogue<State, InMemStorage<State>>;

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
enum Command {
    #[command(description = "Display this text.")]
    Help,
    #[command(description = "Search recipes by title or description.")]
    Search(String),
    #[command(description = "Show a recipe by id.")]
    Recipe(String),
    #[command(description = "Bookmark a recipe by id, or remove the bookmark.")]
    Bookmark(String),
    #[command(description = "List bookmarked recipes.")]
    Bookmarks,
    #[command(description = "Show a bookmarked recipe, using the saved copy when offline.")]
    Saved(String),
    #[command(description = "Submit a recipe, one 'field: value' per line.")]
    Submit(String),
    #[command(description = "Switch between the light and dark theme.")]
    Theme,
    #[command(description = "Suggest a random recipe.")]
    New,
    #[command(description = "Suggest another recipe.")]
    Next,
}

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    FindRecipe(Vec<RecipeId>),
}

struct App {
    service: Arc<dyn RecipesService>,
    bookmarks: BookmarksStore,
    theme: ThemeStore,
}

fn open_storage(config: &EnvConfig) -> Arc<dyn LocalStorage> {
    match SqliteStorage::open(&config.storage_path) {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            log::warn!(
                "Could not open storage at {:?}, keeping state in memory: {}",
                config.storage_path,
                e
            );
            Arc::new(MemoryStorage::new())
        }
    }
}

#[tokio::main]
async fn main() {
    // Load all env variables from .env file.
    dotenv().ok();
    let config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", &config.log_level);
    }
    pretty_env_logger::init();
    log::info!("Starting bot in {:?} mode...", config.mode);
    if let Mode::Other(name) = &config.mode {
        log::warn!("Unknown mode '{}', running as non-production", name);
    }

    let service = match create_recipes_api(&config) {
        Ok(service) => service,
        Err(e) => {
            log::error!("Failed to set up the recipes API: {}", e);
            std::process::exit(1);
        }
    };
    let search_url = match Url::parse(&config.app_url) {
        Ok(url) => url,
        Err(e) => {
            log::error!("Invalid app url '{}': {}", config.app_url, e);
            std::process::exit(1);
        }
    };

    log::info!("Loading storage");
    let storage = open_storage(&config);
    let app = Arc::new(App {
        service: service.clone(),
        bookmarks: BookmarksStore::new(service.clone(), storage.clone()),
        theme: ThemeStore::new(storage),
    });
    match service.list("").await {
        Ok(recipes) => log::info!("{} recipes available", recipes.len()),
        Err(e) => log::warn!("Initial recipe load failed: {}", e),
    }

    let bot = Bot::from_env();
    let sessions = Arc::new(ChatSessions::new(service, search_url));

    let handler = Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<State>, State>()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .branch(dptree::case![Command::Help].endpoint(help))
                .branch(dptree::case![Command::Search(q)].endpoint(search))
                .branch(dptree::case![Command::Recipe(id)].endpoint(show_recipe))
                .branch(dptree::case![Command::Bookmark(id)].endpoint(toggle_bookmark))
                .branch(dptree::case![Command::Bookmarks].endpoint(list_bookmarks))
                .branch(dptree::case![Command::Saved(id)].endpoint(show_saved))
                .branch(dptree::case![Command::Submit(form)].endpoint(submit))
                .branch(dptree::case![Command::Theme].endpoint(toggle_theme))
                .branch(dptree::case![Command::New].endpoint(start_recipe))
                .branch(dptree::case![Command::Next].endpoint(send_random_recipe)),
        )
        .branch(Message::filter_text().endpoint(search_as_you_type));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![app, sessions, InMemStorage::<State>::new()])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn reply(bot: &Bot, msg: &Message, text: String) -> HandlerResult {
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}

async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

async fn search(
    bot: Bot,
    msg: Message,
    sessions: Arc<ChatSessions>,
    q: String,
) -> HandlerResult {
    let session = sessions.session(msg.chat.id.0);
    session.commit(q.trim()).await;
    let text = format_results(&session.store().snapshot(), Some(&session.location()));
    reply(&bot, &msg, text).await
}

async fn search_as_you_type(
    bot: Bot,
    msg: Message,
    sessions: Arc<ChatSessions>,
    text: String,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    let session = sessions.session(chat_id.0);
    session.input_then(text.trim(), move |session| async move {
        let state = session.store().snapshot();
        let text = format_results(&state, Some(&session.location()));
        if let Err(e) = bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::MarkdownV2)
            .await
        {
            log::error!("Failed to send search results to {}: {}", chat_id, e);
        }
    });
    Ok(())
}

async fn show_recipe(bot: Bot, msg: Message, app: Arc<App>, id: String) -> HandlerResult {
    let text = match parse_id(&id) {
        Ok(id) => match app.service.get_by_id(id).await {
            Ok(recipe) => format_recipe(&recipe),
            Err(e) => escape_markdown(&error_message(&e)),
        },
        Err(e) => escape_markdown(&e.to_string()),
    };
    reply(&bot, &msg, text).await
}

async fn toggle_bookmark(
    bot: Bot,
    msg: Message,
    app: Arc<App>,
    sessions: Arc<ChatSessions>,
    id: String,
) -> HandlerResult {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(e) => return reply(&bot, &msg, escape_markdown(&e.to_string())).await,
    };
    let loaded = sessions.session(msg.chat.id.0).store().recipes();
    let text = match app.bookmarks.toggle_id(id, &loaded).await {
        Ok(BookmarkChange::Added(entry)) => {
            format!("Bookmarked *{}*", escape_markdown(&entry.title))
        }
        Ok(BookmarkChange::Removed(entry)) => {
            format!("Removed *{}* from bookmarks", escape_markdown(&entry.title))
        }
        Err(e) => escape_markdown(&error_message(&e)),
    };
    reply(&bot, &msg, text).await
}

async fn list_bookmarks(bot: Bot, msg: Message, app: Arc<App>) -> HandlerResult {
    let bookmarks = app.bookmarks.bookmarks();
    let text = if bookmarks.is_empty() {
        escape_markdown("No bookmarks yet. Use /bookmark <id> to save a recipe.")
    } else {
        bookmarks
            .iter()
            .map(|b| format_summary(b.id, &b.title, &b.description))
            .collect::<Vec<_>>()
            .join("\n\n")
    };
    reply(&bot, &msg, text).await
}

async fn show_saved(bot: Bot, msg: Message, app: Arc<App>, id: String) -> HandlerResult {
    let text = match parse_id(&id) {
        Ok(id) => match app.bookmarks.get_details(id).await {
            Some(BookmarkDetails::Full(recipe)) => format_recipe(&recipe),
            Some(BookmarkDetails::Cached(entry)) => format!(
                "{}\n\n_{}_",
                format_summary(entry.id, &entry.title, &entry.description),
                escape_markdown("Saved copy, the full recipe is unavailable right now.")
            ),
            None => escape_markdown(&format!("Recipe {} is not available.", id)),
        },
        Err(e) => escape_markdown(&e.to_string()),
    };
    reply(&bot, &msg, text).await
}

async fn submit(bot: Bot, msg: Message, app: Arc<App>, form: String) -> HandlerResult {
    let form = RecipeForm::parse_message(&form);
    let validation = validate(&form);
    if !validation.is_valid() {
        return reply(&bot, &msg, format_validation_errors(&validation)).await;
    }
    let text = match app.service.create(&form.to_payload()).await {
        Ok(created) => {
            log::info!("Submitted recipe {} ({})", created.id, created.title);
            format!(
                "Recipe submitted successfully\\. /recipe {}",
                created.id
            )
        }
        Err(e) => escape_markdown(&error_message(&e)),
    };
    reply(&bot, &msg, text).await
}

async fn toggle_theme(bot: Bot, msg: Message, app: Arc<App>) -> HandlerResult {
    let theme = app.theme.toggle();
    let (attribute, value) = app.theme.attribute();
    log::debug!("Theme attribute {}={}", attribute, value);
    reply(
        &bot,
        &msg,
        escape_markdown(&format!("Theme switched to {}.", theme)),
    )
    .await
}

async fn start_recipe(
    bot: Bot,
    dialogue: MyDialogue,
    app: Arc<App>,
    msg: Message,
) -> HandlerResult {
    send_random_recipe(bot, dialogue, app, msg, State::Start).await
}

async fn send_random_recipe(
    bot: Bot,
    dialogue: MyDialogue,
    app: Arc<App>,
    msg: Message,
    state: State,
) -> HandlerResult {
    let mut prev_ids = match state {
        State::Start => Vec::<RecipeId>::new(),
        State::FindRecipe(ids) => ids,
    };
    let recipes = match app.service.list("").await {
        Ok(recipes) => recipes,
        Err(e) => return reply(&bot, &msg, escape_markdown(&error_message(&e))).await,
    };
    let picked = pick_random(&recipes, &prev_ids, &mut rand::thread_rng());
    let random_recipe = match picked {
        Some(recipe) => recipe,
        None => {
            dialogue.update(State::Start).await?;
            return reply(
                &bot,
                &msg,
                escape_markdown("You circled over all recipes. You can start over with /new"),
            )
            .await;
        }
    };

    let text_end = escape_markdown("\n\n/next for another recipe");
    reply(&bot, &msg, format!("{}{}", format_recipe(&random_recipe), text_end)).await?;
    prev_ids.push(random_recipe.id);
    dialogue.update(State::FindRecipe(prev_ids)).await?;

    Ok(())
}
