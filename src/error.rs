//! Clearbin error types

use std::time::Duration;

/// Clearbin error types
#[derive(Debug, thiserror::Error)]
pub enum ClearbinError {
    // Capture errors
    #[error("capture failed: {0}")]
    Capture(String),

    // Encoding errors
    #[error("encoding failed: {0}")]
    Encoding(String),

    // Network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    // Data errors
    #[error("malformed response: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Flow errors
    #[error("classification cancelled")]
    Cancelled,

    #[error("invalid state: {0}")]
    InvalidState(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Coarse grouping of errors, used to pick what the user is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Capture,
    Encoding,
    Network,
    Parse,
    Cancelled,
    Configuration,
    Internal,
}

impl ClearbinError {
    /// Which failure family this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Capture(_) => ErrorCategory::Capture,
            Self::Encoding(_) => ErrorCategory::Encoding,
            Self::Http(_) | Self::Api { .. } | Self::Timeout(_) => ErrorCategory::Network,
            Self::Parse(_) | Self::Json(_) => ErrorCategory::Parse,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Io(_) | Self::InvalidState(_) => ErrorCategory::Internal,
        }
    }

    /// Whether trying the same capture again may succeed.
    ///
    /// Network failures and server-side 5xx responses qualify; a 4xx means
    /// the request itself was rejected.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Capture(_) => true,
            _ => false,
        }
    }

    /// Short message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Capture => "Could not take a photo. Please try again.",
            ErrorCategory::Encoding => "The photo could not be prepared for upload.",
            ErrorCategory::Network => "Could not reach the classification service.",
            ErrorCategory::Parse => "The classification service sent an unexpected reply.",
            ErrorCategory::Cancelled => "Classification was cancelled.",
            ErrorCategory::Configuration => "Clearbin is not configured correctly.",
            ErrorCategory::Internal => "Something went wrong.",
        }
    }
}

/// Result type alias for Clearbin operations
pub type Result<T> = std::result::Result<T, ClearbinError>;
