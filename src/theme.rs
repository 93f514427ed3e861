use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;

use crate::db::LocalStorage;

pub const THEME_KEY: &str = "theme";
pub const THEME_ATTRIBUTE: &str = "data-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn flipped(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ThemeStore {
    storage: Arc<dyn LocalStorage>,
    state: watch::Sender<Theme>,
}

impl ThemeStore {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        let theme = match storage.get_item(THEME_KEY) {
            Ok(Some(raw)) => raw.parse::<Theme>().unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(e) => {
                log::warn!("Could not read theme: {}", e);
                Theme::default()
            }
        };
        let (state, _) = watch::channel(theme);
        ThemeStore { storage, state }
    }

    pub fn theme(&self) -> Theme {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.state.subscribe()
    }

    pub fn attribute(&self) -> (&'static str, &'static str) {
        (THEME_ATTRIBUTE, self.theme().as_str())
    }

    pub fn set(&self, theme: Theme) {
        self.state.send_replace(theme);
        if let Err(e) = self.storage.set_item(THEME_KEY, theme.as_str()) {
            log::warn!("Could not persist theme: {}", e);
        }
    }

    pub fn toggle(&self) -> Theme {
        let next = self.theme().flipped();
        self.set(next);
        next
    }
}
