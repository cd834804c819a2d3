//! Error types for gram-audit-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from the engine
    #[error(transparent)]
    Core(#[from] gram_audit_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Strict-mode gate tripped; carries the non-zero exit reason
    #[error("{message}")]
    StrictFailure { message: String },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Create a strict-mode failure with the given message
    pub fn strict(message: impl Into<String>) -> Self {
        Self::StrictFailure {
            message: message.into(),
        }
    }
}
