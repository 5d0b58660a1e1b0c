//! Canonical key paths
//!
//! Configuration keys are addressed by dot paths (`database.host`). Stores
//! spell the same key with `/` separators under a
//! `{prefix}/{service}/{env}/` namespace. The dot character is not escaped,
//! so a store path that legitimately contains `.` will not round-trip.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Result, ValidationError};

/// Separator used by canonical paths
pub const DOT: char = '.';

/// Separator used by store paths
pub const STORE_SEPARATOR: char = '/';

/// Characters a path segment may not contain
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-]").unwrap());

/// `database.host` -> `database/host`
pub fn dot_to_store_path(path: &str) -> String {
    path.replace(DOT, "/")
}

/// `database/host` -> `database.host`
pub fn store_path_to_dot(path: &str) -> String {
    path.replace(STORE_SEPARATOR, ".")
}

/// `{prefix}/{service}/{env}/{storePath}`
///
/// A trailing `/` on `prefix` is dropped so `/acme/` and `/acme` produce the
/// same namespace.
pub fn build_full_path(prefix: &str, service: &str, env: &str, path: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        prefix.trim_end_matches(STORE_SEPARATOR),
        service,
        env,
        dot_to_store_path(path)
    )
}

/// Split a dot path into segments, rejecting anything that cannot address a
/// schema field.
pub fn validate_path_segments(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Err(invalid(path, "path is empty"));
    }

    let segments: Vec<&str> = path.split(DOT).collect();
    for segment in &segments {
        if segment.is_empty() {
            return Err(invalid(path, "empty segment (leading, trailing or doubled '.')"));
        }
        if let Some(bad) = DISALLOWED.find(segment) {
            return Err(invalid(
                path,
                &format!("segment '{}' contains disallowed character '{}'", segment, bad.as_str()),
            ));
        }
    }
    Ok(segments)
}

fn invalid(path: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidKeyPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
