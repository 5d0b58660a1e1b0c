//! Shared test utilities for the strata workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`] builder for a `.strata/` project on disk
//! - [`evaluator`]: fake template evaluator binaries written as shell scripts

pub mod evaluator;
pub mod project;

pub use project::TestProject;
