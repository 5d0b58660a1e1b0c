//! Error types for strata-fs
//!
//! These are the *system* failures of the workspace: anything caused by the
//! local machine rather than by configuration content.

use std::path::PathBuf;

/// Result type for strata-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while touching the filesystem or spawning binaries
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error during {operation} at {path}: {source}")]
    Io {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Binary not found: '{binary}'. Is it installed and on PATH?")]
    BinaryNotFound { binary: String },

    #[error("Failed to write temporary file {path}: {source}")]
    TempFileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove temporary file {path}: {source}")]
    TempFileCleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} document at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} document for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported document format: '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            operation,
            source,
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::FileNotFound { .. } => "FILE_NOT_FOUND",
            Self::BinaryNotFound { .. } => "BINARY_NOT_FOUND",
            Self::TempFileWrite { .. } => "TEMP_FILE_WRITE",
            Self::TempFileCleanup { .. } => "TEMP_FILE_CLEANUP",
            Self::ConfigParse { .. } => "DOCUMENT_PARSE",
            Self::ConfigSerialize { .. } => "DOCUMENT_SERIALIZE",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::LockFailed { .. } => "LOCK_FAILED",
        }
    }
}
