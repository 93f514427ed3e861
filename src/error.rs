use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Request {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Storage error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Validation(_) => Some(400),
            Error::NotFound(_) => Some(404),
            Error::Request { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
