//! Error types for strata-schema
//!
//! Every variant is a *validation* failure: the configuration content does
//! not fit the declared schema.

/// Result type for strata-schema operations
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Validation failures raised while addressing or checking configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid key path '{path}': {reason}")]
    InvalidKeyPath { path: String, reason: String },

    #[error("Unknown key '{path}': no field '{segment}'{}", format_valid(.valid))]
    PathNotFound {
        path: String,
        segment: String,
        /// Field names that exist at the level where resolution failed
        valid: Vec<String>,
    },

    #[error("Cannot parse value at '{path}' as {expected} (mode {mode}, {length} chars)")]
    ParseFailed {
        path: String,
        expected: String,
        mode: String,
        /// Raw values may be secrets, so only their length is reported
        length: usize,
    },

    #[error("Key '{path}' collides with a value already stored at a parent path")]
    KeyCollision { path: String },

    #[error("Configuration failed schema validation:\n  {}", .violations.join("\n  "))]
    ConstraintViolation { violations: Vec<String> },

    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("Unknown keys in strict mode: {}", .keys.join(", "))]
    UnknownKeys {
        /// Entries in `service:key` form
        keys: Vec<String>,
    },

    #[error("Type mismatches between sources in strict merge:\n  {}", .mismatches.join("\n  "))]
    TypeMismatch { mismatches: Vec<String> },
}

fn format_valid(valid: &[String]) -> String {
    if valid.is_empty() {
        String::new()
    } else {
        format!(" (valid: {})", valid.join(", "))
    }
}

impl ValidationError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidKeyPath { .. } => "INVALID_KEY_PATH",
            Self::PathNotFound { .. } => "SCHEMA_PATH_NOT_FOUND",
            Self::ParseFailed { .. } => "PARSE_FAILED",
            Self::KeyCollision { .. } => "KEY_COLLISION",
            Self::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION",
            Self::InvalidSchema { .. } => "INVALID_SCHEMA",
            Self::UnknownKeys { .. } => "UNKNOWN_KEYS",
            Self::TypeMismatch { .. } => "MERGE_TYPE_MISMATCH",
        }
    }

    /// The key path the error is about, when it concerns a single key.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::InvalidKeyPath { path, .. }
            | Self::PathNotFound { path, .. }
            | Self::ParseFailed { path, .. }
            | Self::KeyCollision { path } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_not_found_lists_siblings() {
        let err = ValidationError::PathNotFound {
            path: "database.hots".into(),
            segment: "hots".into(),
            valid: vec!["host".into(), "port".into()],
        };
        let display = err.to_string();
        assert!(display.contains("database.hots"));
        assert!(display.contains("valid: host, port"));
        assert_eq!(err.code(), "SCHEMA_PATH_NOT_FOUND");
        assert_eq!(err.path(), Some("database.hots"));
    }

    #[test]
    fn parse_failed_never_echoes_value() {
        let err = ValidationError::ParseFailed {
            path: "db.port".into(),
            expected: "integer".into(),
            mode: "auto".into(),
            length: 6,
        };
        assert!(err.to_string().contains("6 chars"));
    }

    #[test]
    fn unknown_keys_joins_entries() {
        let err = ValidationError::UnknownKeys {
            keys: vec!["api:rogue.key".into(), "shared:other".into()],
        };
        assert!(err.to_string().contains("api:rogue.key, shared:other"));
        assert_eq!(err.path(), None);
    }
}
