//! Provider key-value maps to typed trees and back
//!
//! Provider values arrive as a flat map of dot paths to raw strings. Parsing
//! places each value into a nested tree under its canonical path. Keys the
//! schema does not know are never dropped: they go into the tree verbatim and
//! are listed in [`ParsedKv::unknown_keys`] so strict callers can reject them.
//!
//! Arrays are opaque leaves everywhere in this module.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::{ParseMode, SchemaAdapter, ValidationError};

/// Result of parsing one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedKv {
    pub parsed: Value,
    /// Keys that could not be resolved against the schema, as given
    pub unknown_keys: Vec<String>,
    /// Known keys whose raw value did not fit the schema; the raw string is
    /// kept in the tree
    pub invalid_values: Vec<ValidationError>,
}

/// Parse a provider map against `root` using `adapter`.
pub fn parse_provider_kv(
    kv: &BTreeMap<String, String>,
    root: &Value,
    adapter: &dyn SchemaAdapter,
    mode: ParseMode,
) -> ParsedKv {
    let mut out = ParsedKv {
        parsed: Value::Object(Map::new()),
        ..ParsedKv::default()
    };

    for (path, raw) in kv {
        let (target, value) = match adapter.resolve_path(root, path) {
            Ok(node) => match adapter.parse_value(raw, &node.schema, &node.canonical_path, mode) {
                Ok(value) => (node.canonical_path, value),
                Err(err) => {
                    tracing::debug!(path = %path, error = %err, "Value does not fit schema");
                    out.invalid_values.push(err);
                    (node.canonical_path, Value::String(raw.clone()))
                }
            },
            Err(err) => {
                tracing::debug!(path = %path, error = %err, "Key not in schema");
                out.unknown_keys.push(path.clone());
                (path.clone(), Value::String(raw.clone()))
            }
        };

        if !insert_path(&mut out.parsed, &target, value) {
            out.invalid_values
                .push(ValidationError::KeyCollision { path: target });
        }
    }

    out
}

/// Place `value` at dot path `path`, creating intermediate objects.
///
/// Returns `false` when a non-object already occupies a parent position. A
/// path with empty segments is stored under its literal spelling at the top
/// level so it is not lost.
pub fn insert_path(tree: &mut Value, path: &str, value: Value) -> bool {
    let Value::Object(root) = tree else {
        return false;
    };
    if path.split('.').any(str::is_empty) {
        root.insert(path.to_string(), value);
        return true;
    }

    let mut current = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return true;
        }
        let child = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match child {
            Value::Object(map) => current = map,
            _ => return false,
        }
    }
    false
}

/// Flatten a tree into dot paths. Objects are descended (an empty object is
/// kept as a leaf); everything else, arrays included, is a leaf.
pub fn flatten(tree: &Value) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    if let Value::Object(map) = tree {
        flatten_into(map, "", &mut out);
    }
    out
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, out: &mut BTreeMap<String, Value>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(child) if !child.is_empty() => flatten_into(child, &path, out),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

/// Inverse of [`flatten`].
///
/// Later entries win when a leaf and a deeper path collide.
pub fn unflatten(flat: &BTreeMap<String, Value>) -> Value {
    let mut tree = Value::Object(Map::new());
    for (path, value) in flat {
        if !insert_path(&mut tree, path, value.clone()) {
            tracing::debug!(path = %path, "Dropped colliding path while unflattening");
        }
    }
    tree
}

/// Flatten a typed tree and serialize each leaf back to a raw provider
/// string under its schema. Leaves outside the schema are written as JSON
/// unless they are strings.
pub fn serialize_tree(
    tree: &Value,
    root: &Value,
    adapter: &dyn SchemaAdapter,
) -> BTreeMap<String, String> {
    flatten(tree)
        .into_iter()
        .map(|(path, value)| {
            let raw = match adapter.resolve_path(root, &path) {
                Ok(node) => adapter.serialize_value(&value, &node.schema),
                Err(_) => match &value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            };
            (path, raw)
        })
        .collect()
}
