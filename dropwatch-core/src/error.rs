use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors. Check and notification failures never surface here; they are
/// carried as status data and [`crate::notify::NotifyOutcome`] values instead.
#[derive(Error, Debug)]
pub enum DropwatchError {
    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load configuration: {0}")]
    ConfigError(#[from] Box<figment::Error>),

    #[error("HTTP client setup failed: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Failed to read status file {path}: {source}")]
    StateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write status file {path}: {source}")]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DropwatchError>;
