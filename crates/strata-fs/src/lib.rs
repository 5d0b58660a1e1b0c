//! Filesystem primitives for strata
//!
//! Everything in here touches the local disk: owner-only temporary files for
//! handing secrets to child processes, atomic writes for file-backed stores
//! and exported output, multi-format document loading and the canonical
//! `sha256:<hex>` checksum format.
//!
//! [`Error`] is the *system* error kind of the workspace.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod temp;

pub use checksum::{compute_content_checksum, is_checksum};
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::{read_text, write_atomic, write_text};
pub use temp::{
    SecureTempFile, with_json_temp_file, with_json_temp_file_async, with_temp_file,
    with_temp_file_async,
};
