//! Custom error types for chirp.
//!
//! Client-input errors (rejected tweets, missing identifiers) are kept
//! distinct from server-side failures so the boundary can map them to a
//! 400-equivalent `{message, errorKind}` response.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for chirp operations.
#[derive(Error, Debug)]
pub enum ChirpError {
    // =========================================================================
    // Client-input errors (validation / bad request)
    // =========================================================================
    /// The publisher handle was empty.
    #[error("Publisher must not be null or empty")]
    EmptyPublisher,

    /// The tweet text was empty, or its body (links stripped) exceeded the
    /// 140-character limit.
    #[error(
        "Tweet must not be null, empty or greater than 140 characters without URLs (body length: {body_length})"
    )]
    TextTooLongOrEmpty { body_length: usize },

    /// The raw tweet text (links included) exceeded the 500-character hard limit.
    #[error("Tweet must not be greater than 500 characters with URLs (length: {length})")]
    TextExceedsHardLimit { length: usize },

    /// A discard request arrived without a tweet identifier.
    #[error("Tweet ID must not be null")]
    MissingIdentifier,

    // =========================================================================
    // Database errors
    // =========================================================================
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // =========================================================================
    // Serialization errors
    // =========================================================================
    /// JSON serialization failed at the boundary.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // =========================================================================
    // IO / configuration errors
    // =========================================================================
    /// File read/write error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file parsing error.
    #[error("Invalid configuration in '{path}': {reason}")]
    Config { path: PathBuf, reason: String },

    // =========================================================================
    // Generic errors
    // =========================================================================
    /// Wrapped anyhow error for the binary boundary.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for chirp operations.
pub type Result<T> = std::result::Result<T, ChirpError>;

impl ChirpError {
    /// Create a configuration error.
    pub fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is the caller's fault (a 400-equivalent).
    ///
    /// Client errors are never retried and carry no partial side effects,
    /// so the boundary reports them and exits cleanly.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyPublisher
                | Self::TextTooLongOrEmpty { .. }
                | Self::TextExceedsHardLimit { .. }
                | Self::MissingIdentifier
        )
    }

    /// Stable kind token for the boundary's `{message, errorKind}` body.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EmptyPublisher => "EmptyPublisher",
            Self::TextTooLongOrEmpty { .. } => "TextTooLongOrEmpty",
            Self::TextExceedsHardLimit { .. } => "TextExceedsHardLimit",
            Self::MissingIdentifier => "MissingIdentifier",
            Self::Database(_) => "Database",
            Self::Serialization(_) => "Serialization",
            Self::Io(_) => "Io",
            Self::Config { .. } => "Config",
            Self::Other(_) => "Other",
        }
    }
}
