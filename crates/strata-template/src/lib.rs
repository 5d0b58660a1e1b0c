//! Template evaluation for strata
//!
//! The merged configuration is handed to an external evaluator binary
//! (jsonnet-compatible command line) through a secure temp file, never through
//! argv or the environment. Its stdout must be a JSON object or array.
//!
//! Failures are split in two: [`TemplateError`] for problems with the
//! template itself, and [`strata_fs::Error`] for problems with the machine
//! (missing template file, missing binary).

pub mod classify;
pub mod error;
pub mod evaluator;

pub use classify::{Location, classify_stderr};
pub use error::{Error, Result, TemplateError};
pub use evaluator::{DEFAULT_BINARY, DEFAULT_TIMEOUT_MS, TemplateEvaluator, evaluate};
