//! Results returned by workflow operations

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::{ConflictKind, MergeConflict};

/// Advisory condition surfaced alongside a successful result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Warning {
    /// Key not described by the schema; kept verbatim
    UnknownKey { service: String, path: String },
    /// Known key whose raw value did not fit its schema type; kept raw
    InvalidValue {
        service: String,
        path: String,
        message: String,
    },
    /// A later source replaced an earlier value
    Conflict {
        path: String,
        source_a: String,
        source_b: String,
        conflict: ConflictKind,
    },
    /// Schema hash differs from the pinned `schema.hash`
    SchemaDrift { expected: String, actual: String },
}

impl Warning {
    pub(crate) fn from_conflict(conflict: &MergeConflict) -> Self {
        Self::Conflict {
            path: conflict.path.clone(),
            source_a: conflict.source_a.clone(),
            source_b: conflict.source_b.clone(),
            conflict: conflict.kind,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey { service, path } => {
                write!(f, "unknown key {service}:{path} (not in schema, kept as string)")
            }
            Self::InvalidValue {
                service,
                path,
                message,
            } => write!(f, "invalid value for {service}:{path}: {message}"),
            Self::Conflict {
                path,
                source_a,
                source_b,
                conflict,
            } => write!(f, "{conflict} at {path}: {source_b} replaces {source_a}"),
            Self::SchemaDrift { expected, actual } => {
                write!(f, "schema changed: pinned {expected}, found {actual}")
            }
        }
    }
}

/// Terminal artifact of an export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportResult {
    /// Validated configuration tree
    pub config: Value,
    /// `config` rendered in the requested format
    pub formatted: String,
    pub conflicts: Vec<MergeConflict>,
    pub warnings: Vec<Warning>,
    pub schema_hash: String,
}

/// A single typed value read from the primary source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetResult {
    pub path: String,
    pub value: Value,
    #[serde(rename = "type")]
    pub type_tag: String,
}

/// Outcome of a write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetResult {
    pub path: String,
    pub value: Value,
    /// Raw string handed to the provider
    pub stored: String,
}

/// One row of `list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Whether the primary source holds a value
    pub present: bool,
    /// `false` for stored keys the schema does not describe
    pub in_schema: bool,
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    /// Paths written, in order
    pub written: Vec<String>,
    pub warnings: Vec<Warning>,
}
