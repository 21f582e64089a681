// src/error.rs

//! Unified error handling for the aggregation engine.

use std::fmt;

use thiserror::Error;

/// Result type alias for aggregation operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// Only `Upstream` (and transport errors raised while fetching a result page)
/// abort an ingestion request. Per-document parse problems never appear here;
/// they are recorded on the affected notice via its `source_error` field and
/// the batch continues.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request validation error, raised before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// A single notice document was malformed; captured per-record, never fatal
    #[error("Document parse error: {0}")]
    Document(String),

    /// Page-level fetch or initial navigation failure, fatal to the request
    #[error("Upstream error for {context}: {message}")]
    Upstream { context: String, message: String },

    /// Browser session could not be launched or driven
    #[error("Browser error: {0}")]
    Browser(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
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

    /// Create a per-document parse error.
    pub fn document(message: impl fmt::Display) -> Self {
        Self::Document(message.to_string())
    }

    /// Create a fatal upstream error with context.
    pub fn upstream(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Upstream {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a browser session error.
    pub fn browser(message: impl fmt::Display) -> Self {
        Self::Browser(message.to_string())
    }
}
