use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;

pub const API_BASE_VAR: &str = "RECIPES_API_BASE";
pub const BACKEND_URL_VAR: &str = "RECIPES_BACKEND_URL";
pub const MODE_VAR: &str = "RECIPES_ENV";
pub const LOG_LEVEL_VAR: &str = "RECIPES_LOG_LEVEL";
pub const MOCK_LATENCY_VAR: &str = "RECIPES_MOCK_LATENCY_MS";
pub const STORAGE_PATH_VAR: &str = "RECIPES_STORAGE_PATH";
pub const APP_URL_VAR: &str = "RECIPES_APP_URL";

pub const DEFAULT_MOCK_LATENCY_MS: u64 = 250;
pub const DEFAULT_STORAGE_PATH: &str = "/tmp/recipe-hub/storage.db";
pub const DEFAULT_APP_URL: &str = "http://localhost:3000/search";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Development,
    Production,
    Test,
    // Unrecognized names are kept and run as non-production.
    Other(String),
}

impl FromStr for Mode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Ok(match name.as_str() {
            "development" | "dev" => Mode::Development,
            "production" | "prod" => Mode::Production,
            "test" => Mode::Test,
            _ => Mode::Other(name),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    pub api_base: String,
    pub backend_url: String,
    pub mode: Mode,
    pub log_level: String,
    pub use_mock: bool,
    pub mock_latency: Duration,
    pub storage_path: PathBuf,
    pub app_url: String,
}

impl EnvConfig {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base = get(API_BASE_VAR).unwrap_or_default();
        let backend_url = get(BACKEND_URL_VAR).unwrap_or_default();
        let mode = match get(MODE_VAR) {
            Some(raw) => raw.parse::<Mode>().unwrap_or_default(),
            None => Mode::default(),
        };
        let log_level = get(LOG_LEVEL_VAR).unwrap_or_else(|| "info".to_string());
        let mock_latency = match get(MOCK_LATENCY_VAR) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("{} must be a number of milliseconds", MOCK_LATENCY_VAR))
            })?,
            None => DEFAULT_MOCK_LATENCY_MS,
        };
        let storage_path = get(STORAGE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH));
        let app_url = get(APP_URL_VAR).unwrap_or_else(|| DEFAULT_APP_URL.to_string());

        let use_mock = api_base.is_empty() && backend_url.is_empty() && mode != Mode::Production;

        Ok(EnvConfig {
            api_base,
            backend_url,
            mode,
            log_level,
            use_mock,
            mock_latency: Duration::from_millis(mock_latency),
            storage_path,
            app_url,
        })
    }

    pub fn is_production(&self) -> bool {
        self.mode == Mode::Production
    }

    pub fn resolve_base_url(&self) -> String {
        if !self.backend_url.is_empty() {
            return self.backend_url.trim_end_matches('/').to_string();
        }
        if !self.api_base.is_empty() {
            return self.api_base.trim_end_matches('/').to_string();
        }
        String::new()
    }
}
