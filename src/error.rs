//! Error types for Dealdesk

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("total investment is zero, ROI is undefined")]
    DivisionByZero,

    #[error("missing required property field: {0}")]
    MissingField(&'static str),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document store error: {0}")]
    Backend(String),

    #[error("AI model error: {0}")]
    Upstream(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error was caused by the caller's input rather than a
    /// collaborator failure. The API layer maps these to 400.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::DivisionByZero | Error::MissingField(_)
        )
    }
}
