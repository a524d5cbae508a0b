//! Error types for pagekit
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Every failure is terminal for the request (or page) in which it occurs.
//! Nothing here is retried automatically; callers re-issue failed operations.

use thiserror::Error;

/// Placeholder rendered when a response carried no URL or status
const UNKNOWN: &str = "—";

/// The main error type for pagekit
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Request Errors
    // ============================================================================
    #[error("Invalid URL")]
    InvalidUrl,

    #[error("Session was released before the request completed")]
    ReleasedSession,

    #[error("{}. Invalid response. {message}. {}", url.as_deref().unwrap_or(UNKNOWN), status.map_or(-1, i32::from))]
    InvalidResponse {
        url: Option<String>,
        status: Option<u16>,
        message: String,
    },

    #[error("Can't load more")]
    CannotLoadMore,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Runtime Errors
    // ============================================================================
    #[error("Lane error: {message}")]
    Lane { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid response error
    pub fn invalid_response(
        url: Option<&str>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidResponse {
            url: url.map(str::to_string),
            status,
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a lane error
    pub fn lane(message: impl Into<String>) -> Self {
        Self::Lane {
            message: message.into(),
        }
    }

    /// Check whether the failure came from the owning session going away
    pub fn is_released_session(&self) -> bool {
        matches!(self, Self::ReleasedSession)
    }

    /// Status code attached to the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidResponse { status, .. } => *status,
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for pagekit
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
