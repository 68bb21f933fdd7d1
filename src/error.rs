// src/error.rs

//! Unified error handling for the launcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for launcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Zip archive could not be read
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Extraction pattern did not compile or lacks a capture group
    #[error("Invalid pattern '{name}': {message}")]
    Pattern { name: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Download of a package or launcher binary failed
    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    /// Client installation failed
    #[error("Install error: {0}")]
    Install(String),

    /// Game client or new launcher could not be started
    #[error("Launch error: {0}")]
    Launch(String),
}

impl AppError {
    /// Create a pattern error.
    pub fn pattern(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Pattern {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a download error with the offending URL.
    pub fn download(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Download {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an install error.
    pub fn install(message: impl fmt::Display) -> Self {
        Self::Install(message.to_string())
    }

    /// Create a launch error.
    pub fn launch(message: impl fmt::Display) -> Self {
        Self::Launch(message.to_string())
    }
}
