//! Error types for the salonsync core.

use thiserror::Error;

/// Errors that can occur in sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Polling session is already running; stop it before starting again")]
    AlreadyRunning,

    #[error("Server responded with {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Could not encode request: {0}")]
    Encode(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid working hours: {0}")]
    InvalidHours(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SyncError {
    /// Whether the next poll has a chance of succeeding without user action.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Transport(_) | SyncError::Timeout(_) => true,
            SyncError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Decode(err.to_string())
        } else {
            SyncError::Transport(err.to_string())
        }
    }
}

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
