//! Result and error types for the notifier.

use thiserror::Error;

/// Result type for notifier operations
pub type NotifierResult<T> = Result<T, NotifierError>;

/// Errors that can occur while driving the portal or relaying messages
#[derive(Debug, Error)]
pub enum NotifierError {
    /// A node was asked for an element name it never registered
    #[error("No selector registered for '{name}' in node '{node}'")]
    SelectorNotFound {
        /// Node that was queried
        node: String,
        /// Logical element name
        name: String,
    },

    /// The element hosting an embedded document never appeared
    #[error("Frame '{selector}' of node '{node}' did not appear within {ms}ms")]
    FrameResolutionTimeout {
        /// Node whose frame was being resolved
        node: String,
        /// Frame-hosting selector
        selector: String,
        /// Wait budget in milliseconds
        ms: u64,
    },

    /// An element did not reach the awaited state in time
    #[error("Timed out after {ms}ms waiting for element '{selector}'")]
    ElementWaitTimeout {
        /// Resolved address
        selector: String,
        /// Wait budget in milliseconds
        ms: u64,
    },

    /// The login form was still present after submitting credentials
    #[error("Login rejected: the username field is still present after submitting credentials")]
    LoginRejected,

    /// Click attempted on a disabled element
    #[error("Element '{selector}' is disabled")]
    ElementDisabled {
        /// Resolved address
        selector: String,
    },

    /// A child node outlived its parent
    #[error("Node '{node}' lost its parent")]
    DetachedNode {
        /// Orphaned node
        node: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Failure reported by the browser driver
    #[error("Browser driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Attachment transfer failed
    #[error("Download failed: {message}")]
    Download {
        /// Error message
        message: String,
    },

    /// Notification delivery failed
    #[error("Notification failed: {message}")]
    Notification {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NotifierError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a download error
    #[must_use]
    pub fn download(message: impl Into<String>) -> Self {
        Self::Download {
            message: message.into(),
        }
    }

    /// Create a notification error
    #[must_use]
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }

    /// Whether this error comes from a wait running out of time
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::FrameResolutionTimeout { .. } | Self::ElementWaitTimeout { .. }
        )
    }
}
