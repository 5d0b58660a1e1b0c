//! Error types for strata-template

use crate::classify::Location;

/// Result type for template evaluation
pub type Result<T> = std::result::Result<T, Error>;

/// Failures attributable to the template or the evaluator's behaviour.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    #[error("Template references a missing variable{}: {message}", at(.location))]
    MissingVariable {
        message: String,
        location: Option<Location>,
    },

    #[error("Template syntax error{}: {message}", at(.location))]
    Syntax {
        message: String,
        location: Option<Location>,
    },

    #[error("Template evaluation failed{}: {message}", at(.location))]
    Runtime {
        message: String,
        location: Option<Location>,
    },

    #[error("Template evaluation timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Template produced invalid output (expected a JSON object or array): {preview}")]
    InvalidOutput {
        /// At most the first 100 characters of stdout
        preview: String,
    },

    #[error("Template evaluator exited with {} and no diagnostics", status_text(.status))]
    ProcessFailed { status: Option<i32> },
}

fn at(location: &Option<Location>) -> String {
    location
        .as_ref()
        .map(|loc| format!(" at {loc}"))
        .unwrap_or_default()
}

fn status_text(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

impl TemplateError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingVariable { .. } => "TEMPLATE_MISSING_VARIABLE",
            Self::Syntax { .. } => "TEMPLATE_SYNTAX_ERROR",
            Self::Runtime { .. } => "TEMPLATE_RUNTIME_ERROR",
            Self::Timeout { .. } => "TEMPLATE_TIMEOUT",
            Self::InvalidOutput { .. } => "TEMPLATE_INVALID_OUTPUT",
            Self::ProcessFailed { .. } => "TEMPLATE_PROCESS_FAILED",
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::MissingVariable { location, .. }
            | Self::Syntax { location, .. }
            | Self::Runtime { location, .. } => location.as_ref(),
            _ => None,
        }
    }
}

/// Errors from [`crate::evaluate`]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    System(#[from] strata_fs::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Template(e) => e.code(),
            Self::System(e) => e.code(),
        }
    }
}
