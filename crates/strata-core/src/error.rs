//! Error types for strata-core
//!
//! Every failure of the workspace surfaces here with one of four kinds and a
//! stable machine-readable code.

use std::fmt;
use std::path::PathBuf;

use strata_provider::ProviderError;
use strata_schema::ValidationError;
use strata_template::TemplateError;

/// Result type for strata-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Provider,
    Validation,
    Template,
    System,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Validation => "validation",
            Self::Template => "template",
            Self::System => "system",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in strata-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file could not be interpreted
    #[error("Invalid configuration in {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// A required setting is absent from every layer and from the flags
    #[error("Missing setting '{key}': set it in .strata/config.toml or pass {flag}")]
    ConfigMissing { key: String, flag: String },

    /// A setting has a value outside its allowed set
    #[error("Invalid value '{value}' for {key} (expected {expected})")]
    InvalidSetting {
        key: String,
        value: String,
        expected: String,
    },

    /// Output could not be rendered in the requested format
    #[error("Failed to render {format} output: {message}")]
    Format { format: String, message: String },

    // Transparent wrappers for underlying crate errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    System(#[from] strata_fs::Error),
}

impl From<strata_template::Error> for Error {
    fn from(err: strata_template::Error) -> Self {
        match err {
            strata_template::Error::Template(e) => Self::Template(e),
            strata_template::Error::System(e) => Self::System(e),
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Provider(ProviderError::Storage(_)) => ErrorKind::System,
            Self::Provider(_) => ErrorKind::Provider,
            Self::Template(_) => ErrorKind::Template,
            Self::System(_)
            | Self::ConfigInvalid { .. }
            | Self::ConfigMissing { .. }
            | Self::InvalidSetting { .. }
            | Self::Format { .. } => ErrorKind::System,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigInvalid { .. } => "CONFIG_INVALID",
            Self::ConfigMissing { .. } => "CONFIG_MISSING",
            Self::InvalidSetting { .. } => "INVALID_SETTING",
            Self::Format { .. } => "FORMAT_FAILED",
            Self::Validation(e) => e.code(),
            Self::Provider(e) => e.code(),
            Self::Template(e) => e.code(),
            Self::System(e) => e.code(),
        }
    }
}
