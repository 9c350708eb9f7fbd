//! Error types for the gymsync_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gymsync_core operations
///
/// Only rejected input and infrastructure failures surface here. Commands
/// that target a missing id or an inactive session are not errors; the
/// controller reports them as `Outcome::Ignored`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A command was rejected because of missing or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// Persistence gateway error
    #[error("Store error: {0}")]
    Store(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Error::Validation(reason.into())
    }

    /// True when the error is a rejected command rather than a system failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
