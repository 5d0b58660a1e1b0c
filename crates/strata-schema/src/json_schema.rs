//! Adapter for JSON Schema documents
//!
//! Fields are found through `properties` (including those contributed by
//! `allOf` members) and local `$ref`s into `#/definitions` or `#/$defs`.
//! An object whose `additionalProperties` is itself a schema accepts any
//! segment. Whole-tree validation is delegated to the `jsonschema` crate.

use serde_json::Value;

use crate::adapter::{match_field, serialize_for};
use crate::{
    JsonType, LeafPath, ParseMode, ResolvedSchemaNode, Result, SchemaAdapter, SchemaKind, TypeSet,
    ValidationError, parse,
};

/// Bound on `$ref` chains and leaf enumeration depth (schemas may recurse)
const MAX_DEPTH: usize = 64;

const COMPOSITION_KEYWORDS: [&str; 3] = ["allOf", "anyOf", "oneOf"];

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSchemaAdapter;

impl JsonSchemaAdapter {
    pub fn new() -> Self {
        Self
    }

    fn deref<'a>(&self, root: &'a Value, node: &'a Value) -> &'a Value {
        let mut current = node;
        for _ in 0..MAX_DEPTH {
            let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
                return current;
            };
            match lookup_ref(root, reference) {
                Some(target) => current = target,
                None => {
                    tracing::debug!(reference, "Unresolvable $ref, treating node as-is");
                    return current;
                }
            }
        }
        current
    }

    /// Named children of an object schema, in name order.
    fn properties<'a>(&self, root: &'a Value, node: &'a Value) -> Vec<(&'a String, &'a Value)> {
        let mut props: Vec<(&String, &Value)> = Vec::new();
        let mut collect = |schema: &'a Value| {
            if let Some(map) = schema.get("properties").and_then(Value::as_object) {
                for (name, child) in map {
                    if !props.iter().any(|(existing, _)| *existing == name) {
                        props.push((name, child));
                    }
                }
            }
        };
        collect(node);
        if let Some(members) = node.get("allOf").and_then(Value::as_array) {
            for member in members {
                collect(self.deref(root, member));
            }
        }
        props.sort_by(|a, b| a.0.cmp(b.0));
        props
    }

    fn type_set(&self, root: &Value, schema: &Value) -> TypeSet {
        let schema = self.deref(root, schema);
        match schema.get("type") {
            Some(Value::String(tag)) => JsonType::from_tag(tag).map(TypeSet::only).unwrap_or_default(),
            Some(Value::Array(tags)) => {
                TypeSet::of(tags.iter().filter_map(Value::as_str).filter_map(JsonType::from_tag))
            }
            _ => {
                if let Some(values) = schema.get("enum").and_then(Value::as_array) {
                    return TypeSet::of(values.iter().map(JsonType::of));
                }
                if let Some(value) = schema.get("const") {
                    return TypeSet::only(JsonType::of(value));
                }
                for keyword in ["anyOf", "oneOf"] {
                    if let Some(members) = schema.get(keyword).and_then(Value::as_array) {
                        return members
                            .iter()
                            .map(|m| self.type_set(root, m))
                            .reduce(TypeSet::union)
                            .unwrap_or_default();
                    }
                }
                if schema.get("properties").is_some() {
                    return TypeSet::only(JsonType::Object);
                }
                TypeSet::any()
            }
        }
    }

    /// Replace `$ref` members of composition keywords so the returned node
    /// stands on its own without the root.
    fn inline_refs(&self, root: &Value, node: &Value) -> Value {
        let mut out = node.clone();
        for keyword in COMPOSITION_KEYWORDS {
            if let Some(members) = node.get(keyword).and_then(Value::as_array) {
                let inlined: Vec<Value> =
                    members.iter().map(|m| self.deref(root, m).clone()).collect();
                out[keyword] = Value::Array(inlined);
            }
        }
        out
    }

    fn collect_leaves(
        &self,
        root: &Value,
        node: &Value,
        prefix: &str,
        depth: usize,
        out: &mut Vec<LeafPath>,
    ) {
        let node = self.deref(root, node);
        let props = self.properties(root, node);
        if props.is_empty() || depth >= MAX_DEPTH {
            if !prefix.is_empty() {
                out.push(LeafPath {
                    path: prefix.to_string(),
                    schema: self.inline_refs(root, node),
                });
            }
            return;
        }
        for (name, child) in props {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };
            self.collect_leaves(root, child, &path, depth + 1, out);
        }
    }
}

fn lookup_ref<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#')?;
    if pointer.is_empty() {
        Some(root)
    } else {
        root.pointer(pointer)
    }
}

/// `/database/port` -> `database.port`
fn pointer_to_dot(pointer: &str) -> String {
    let trimmed = pointer.trim_start_matches('/');
    if trimmed.is_empty() {
        "(root)".to_string()
    } else {
        trimmed.replace('/', ".")
    }
}

impl SchemaAdapter for JsonSchemaAdapter {
    fn kind(&self) -> SchemaKind {
        SchemaKind::JsonSchema
    }

    fn is_schema(&self, candidate: &Value) -> bool {
        let Some(map) = candidate.as_object() else {
            return false;
        };
        if map.contains_key("$schema") || map.contains_key("$ref") {
            return true;
        }
        if map.get("properties").is_some_and(Value::is_object) {
            return true;
        }
        match map.get("type") {
            Some(Value::String(tag)) => JsonType::from_tag(tag).is_some(),
            Some(Value::Array(tags)) => tags
                .iter()
                .all(|t| t.as_str().and_then(JsonType::from_tag).is_some()),
            _ => COMPOSITION_KEYWORDS.iter().any(|k| map.contains_key(*k)),
        }
    }

    fn resolve_segments(&self, root: &Value, segments: &[&str]) -> Result<ResolvedSchemaNode> {
        let mut node = self.deref(root, root);
        let mut canonical: Vec<String> = Vec::with_capacity(segments.len());

        for segment in segments {
            let props = self.properties(root, node);
            let names: Vec<&String> = props.iter().map(|(name, _)| *name).collect();

            if let Some(name) = match_field(segment, &names) {
                let child = props
                    .iter()
                    .find(|(candidate, _)| *candidate == name)
                    .map(|(_, child)| *child)
                    .unwrap_or(&Value::Null);
                canonical.push(name.clone());
                node = self.deref(root, child);
                continue;
            }

            match node.get("additionalProperties") {
                Some(extra @ Value::Object(_)) => {
                    canonical.push((*segment).to_string());
                    node = self.deref(root, extra);
                }
                _ => {
                    return Err(ValidationError::PathNotFound {
                        path: segments.join("."),
                        segment: (*segment).to_string(),
                        valid: names.into_iter().cloned().collect(),
                    });
                }
            }
        }

        Ok(ResolvedSchemaNode {
            schema: self.inline_refs(root, node),
            canonical_path: canonical.join("."),
        })
    }

    fn get_all_leaf_paths(&self, root: &Value) -> Vec<LeafPath> {
        let mut out = Vec::new();
        self.collect_leaves(root, root, "", 0, &mut out);
        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }

    fn describe_type(&self, schema: &Value) -> String {
        self.type_set(schema, schema).describe()
    }

    fn parse_value(&self, raw: &str, schema: &Value, path: &str, mode: ParseMode) -> Result<Value> {
        parse::parse_raw(raw, &self.type_set(schema, schema), path, mode)
    }

    fn serialize_value(&self, value: &Value, schema: &Value) -> String {
        let integer_field = self.type_set(schema, schema) == TypeSet::only(JsonType::Integer);
        serialize_for(value, integer_field)
    }

    fn validate(&self, root: &Value, tree: &Value) -> Result<()> {
        let compiled =
            jsonschema::JSONSchema::compile(root).map_err(|e| ValidationError::InvalidSchema {
                message: e.to_string(),
            })?;

        let violations: Vec<String> = match compiled.validate(tree) {
            Ok(()) => return Ok(()),
            Err(errors) => errors
                .map(|err| {
                    let path = pointer_to_dot(&err.instance_path.to_string());
                    let schema_path = err.schema_path.to_string();
                    let keyword = schema_path.rsplit('/').next().unwrap_or_default().to_string();
                    // Only property-name messages are echoed; others may quote secret values
                    match keyword.as_str() {
                        "required" | "additionalProperties" => format!("{}: {}", path, err),
                        _ => format!("{}: does not satisfy '{}' ({})", path, keyword, schema_path),
                    }
                })
                .collect(),
        };

        Err(ValidationError::ConstraintViolation { violations })
    }
}
