//! Error types for strata-provider

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Failures at the provider boundary
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Cannot reach provider '{provider}': {message}")]
    Connection { provider: String, message: String },

    #[error("Provider '{provider}' rejected credentials: {message}")]
    Authentication { provider: String, message: String },

    #[error("Provider '{provider}' denied access to {path}")]
    Permission { provider: String, path: String },

    #[error("Key not found: {path}")]
    NotFound { path: String },

    #[error("Refusing to modify protected environment '{env}' (pass --allow-protected to override)")]
    GuardViolation { env: String },

    #[error("Unknown provider '{name}' (available: {})", .available.join(", "))]
    UnknownProvider { name: String, available: Vec<String> },

    #[error("Invalid configuration for provider '{provider}': {message}")]
    InvalidConfig { provider: String, message: String },

    #[error("Provider store error: {0}")]
    Storage(#[from] strata_fs::Error),
}

impl ProviderError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "PROVIDER_CONNECTION",
            Self::Authentication { .. } => "PROVIDER_AUTHENTICATION",
            Self::Permission { .. } => "PROVIDER_PERMISSION",
            Self::NotFound { .. } => "PROVIDER_KEY_NOT_FOUND",
            Self::GuardViolation { .. } => "GUARD_VIOLATION",
            Self::UnknownProvider { .. } => "PROVIDER_NOT_FOUND",
            Self::InvalidConfig { .. } => "PROVIDER_CONFIG",
            Self::Storage(e) => e.code(),
        }
    }
}
