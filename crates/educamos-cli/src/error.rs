//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid cron expression
    #[error("Invalid schedule '{expression}': {message}")]
    Schedule {
        /// Expression as given
        expression: String,
        /// Parser message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Library error
    #[error(transparent)]
    Notifier(#[from] educamos_notifier::NotifierError),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a schedule error
    #[must_use]
    pub fn schedule(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schedule {
            expression: expression.into(),
            message: message.into(),
        }
    }
}
