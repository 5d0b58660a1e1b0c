//! The schema adapter capability trait
//!
//! A run uses exactly one adapter, chosen from configuration through
//! [`SchemaKind`]. Schemas are always plain JSON documents; each adapter
//! decides how to read them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{JsonSchemaAdapter, Result, ShorthandAdapter, ValidationError, canonical, keypath};

/// A sub-schema located by a key path.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchemaNode {
    pub schema: Value,
    /// The path as spelled by the schema (case and aliases corrected)
    pub canonical_path: String,
}

/// A terminal field of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafPath {
    pub path: String,
    pub schema: Value,
}

/// How a raw provider string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Most specific type the sub-schema allows
    #[default]
    Auto,
    String,
    Integer,
    Float,
    Boolean,
    Json,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "string" => Ok(Self::String),
            "integer" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            "boolean" => Ok(Self::Boolean),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown parse mode '{}' (expected auto, string, integer, float, boolean or json)",
                other
            )),
        }
    }
}

/// Which schema library the run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaKind {
    #[default]
    JsonSchema,
    Shorthand,
}

impl SchemaKind {
    /// Construct the adapter for this kind.
    pub fn adapter(&self) -> Box<dyn SchemaAdapter> {
        match self {
            Self::JsonSchema => Box::new(JsonSchemaAdapter::new()),
            Self::Shorthand => Box::new(ShorthandAdapter::new()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonSchema => "json-schema",
            Self::Shorthand => "shorthand",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "json-schema" | "jsonschema" => Ok(Self::JsonSchema),
            "shorthand" => Ok(Self::Shorthand),
            other => Err(format!(
                "unknown schema kind '{}' (expected json-schema or shorthand)",
                other
            )),
        }
    }
}

/// Operations every supported schema library provides.
pub trait SchemaAdapter: Send + Sync {
    fn kind(&self) -> SchemaKind;

    /// Whether `candidate` is a schema this adapter understands.
    fn is_schema(&self, candidate: &Value) -> bool;

    /// Walk already-validated segments down the schema.
    fn resolve_segments(&self, root: &Value, segments: &[&str]) -> Result<ResolvedSchemaNode>;

    /// Every terminal field with its dot path, sorted by path.
    fn get_all_leaf_paths(&self, root: &Value) -> Vec<LeafPath>;

    /// Short type tag such as `"integer"` or `"string|null"`.
    fn describe_type(&self, schema: &Value) -> String;

    fn parse_value(&self, raw: &str, schema: &Value, path: &str, mode: ParseMode) -> Result<Value>;

    fn serialize_value(&self, value: &Value, schema: &Value) -> String;

    /// Check a complete configuration tree, collecting every violation.
    fn validate(&self, root: &Value, tree: &Value) -> Result<()>;

    /// Resolve a dot path. This is the one place paths are validated before
    /// they address the schema.
    fn resolve_path(&self, root: &Value, path: &str) -> Result<ResolvedSchemaNode> {
        let segments = keypath::validate_path_segments(path)?;
        self.resolve_segments(root, &segments)
    }

    /// `sha256:<hex>` over the key-order-independent form of the schema.
    fn compute_schema_hash(&self, schema: &Value) -> String {
        canonical::schema_hash(schema)
    }

    /// Reject a document that is not a schema of this kind.
    fn ensure_schema(&self, candidate: &Value) -> Result<()> {
        if self.is_schema(candidate) {
            Ok(())
        } else {
            Err(ValidationError::InvalidSchema {
                message: format!("document is not a {} schema", self.kind()),
            })
        }
    }
}

/// Find `segment` among `fields`: exact match first, then a unique
/// case-insensitive match.
pub(crate) fn match_field<'a>(segment: &str, fields: &[&'a String]) -> Option<&'a String> {
    if let Some(exact) = fields.iter().copied().find(|f| f.as_str() == segment) {
        return Some(exact);
    }
    let mut folded = fields.iter().copied().filter(|f| f.eq_ignore_ascii_case(segment));
    match (folded.next(), folded.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

/// Serialize a typed value for storage. Integral floats under an integer
/// field are written without a fractional part.
pub(crate) fn serialize_for(value: &Value, integer_field: bool) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if integer_field && n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Null | Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
