//! Command implementations for strata-cli

pub mod export;
pub mod import;
pub mod keys;
pub mod schema;

pub use export::run_export;
pub use import::run_import;
pub use keys::{run_delete, run_get, run_list, run_set};
pub use schema::run_schema_hash;

use colored::Colorize;
use serde::Serialize;
use strata_core::Warning;

use crate::error::Result;

/// Advisory output on stderr; stdout stays machine-readable.
pub(crate) fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("{}: {}", "warning".yellow().bold(), warning);
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
