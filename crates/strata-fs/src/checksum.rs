//! SHA-256 checksum utilities
//!
//! One canonical checksum format (`sha256:<hex>`) is used for schema drift
//! detection across runs.

use sha2::{Digest, Sha256};

/// Prefix for all checksums produced by this module
pub const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of string content.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Whether `candidate` looks like a checksum in the canonical format.
pub fn is_checksum(candidate: &str) -> bool {
    candidate
        .strip_prefix(PREFIX)
        .is_some_and(|hex| hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
