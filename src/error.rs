//! Error types
//!
//! `LoadError` is what a single load attempt can end in. Its `Display` text is
//! exactly what the error panel shows, so keep the messages readable.

use thiserror::Error;

/// Why loading the tree document failed. Every variant is terminal for that
/// attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Network or file read failure
    #[error("{0}")]
    Transport(String),

    /// Non-success HTTP response
    #[error("HTTP {0}: unable to load directory tree data")]
    Status(u16),

    /// Document decoded but does not have the tree shape
    #[error("directory tree data format error: {0}")]
    Format(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Format(e.to_string())
    }
}

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the CLI, server and terminal browser.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("server error: {0}")]
    Server(String),

    #[error("file watch error: {0}")]
    Watch(#[from] notify::Error),
}
