//! Error types for strata-cli

use serde_json::json;
use strata_core::ErrorKind;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from strata-core
    #[error(transparent)]
    Core(#[from] strata_core::Error),

    /// Error from strata-fs
    #[error(transparent)]
    Fs(#[from] strata_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Result could not be encoded as JSON
    #[error("Failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),

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

    pub fn code(&self) -> &'static str {
        match self {
            Self::Core(e) => e.code(),
            Self::Fs(e) => e.code(),
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "FORMAT_FAILED",
            Self::User { .. } => "INVALID_ARGUMENT",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Core(e) => e.kind(),
            _ => ErrorKind::System,
        }
    }

    /// `{"error": {"code", "kind", "message"}}` for `--json` callers.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "error": {
                "code": self.code(),
                "kind": self.kind().as_str(),
                "message": self.to_string(),
            }
        })
    }
}
