//! Core orchestration layer for strata
//!
//! This crate ties the Layer 0 crates together:
//!
//! - **Merge engine**: ordered deep merge of named sources with conflict records
//! - **Output formats**: `env`, `json` and `yaml` rendering
//! - **Configuration resolution**: layered `.strata/config.toml` plus flags
//! - **Workflow**: export, get, set, delete, list, import and schema hash
//!
//! # Architecture
//!
//! ```text
//!                        strata-cli
//!                            |
//!                       strata-core
//!                            |
//!     +--------------+-------+--------+----------------+
//!     |              |                |                |
//! strata-fs   strata-schema   strata-template   strata-provider
//! ```
//!
//! # Example
//!
//! ```ignore
//! use strata_core::{ConfigResolver, Overrides, Workflow};
//! use strata_provider::ProviderRegistry;
//!
//! let config = ConfigResolver::new("/path/to/project").resolve_with(&Overrides {
//!     env: Some("dev".into()),
//!     ..Overrides::default()
//! })?;
//! let result = Workflow::new(config, ProviderRegistry::with_builtins()).export().await?;
//! print!("{}", result.formatted);
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod merge;
pub mod workflow;

pub use config::{ConfigResolver, Manifest, Overrides, ResolvedConfig};
pub use error::{Error, ErrorKind, Result};
pub use format::{OutputFormat, env_key, env_value};
pub use merge::{ConflictKind, MergeConflict, MergeResult, merge_sources};
pub use workflow::{
    ExportResult, ExportStage, GetResult, ImportReport, ListEntry, LoadedSchema, SetResult,
    Warning, Workflow,
};
