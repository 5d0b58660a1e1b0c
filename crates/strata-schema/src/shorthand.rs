//! Adapter for shorthand schema documents
//!
//! A shorthand schema is a nested object. Each entry is one of:
//!
//! - a type tag: `"string"`, `"integer"`, `"number"`, `"boolean"`, `"array"`,
//!   `"object"`, `"null"`, `"any"`, or a `|`-separated union of them; a
//!   trailing `!` marks the field required (`"integer!"`)
//! - a field spec: an object with `$type` plus optional `required`, `enum`,
//!   `minimum`, `maximum` and `aliases`
//! - a group: any other object, holding further entries
//!
//! ```json
//! {
//!   "database": {
//!     "host": "string!",
//!     "port": {"$type": "integer", "minimum": 1, "aliases": ["pgport"]}
//!   }
//! }
//! ```

use serde_json::{Map, Value};

use crate::adapter::{match_field, serialize_for};
use crate::{
    JsonType, LeafPath, ParseMode, ResolvedSchemaNode, Result, SchemaAdapter, SchemaKind, TypeSet,
    ValidationError, parse,
};

const TYPE_KEY: &str = "$type";

#[derive(Debug, Default, Clone, Copy)]
pub struct ShorthandAdapter;

/// A parsed field declaration.
#[derive(Debug, Clone, PartialEq)]
struct FieldSpec {
    types: TypeSet,
    required: bool,
    aliases: Vec<String>,
    allowed: Option<Vec<Value>>,
    minimum: Option<f64>,
    maximum: Option<f64>,
}

enum Node<'a> {
    Field(FieldSpec),
    Group(&'a Map<String, Value>),
}

fn parse_tag(tag: &str) -> Option<(TypeSet, bool)> {
    let (body, required) = match tag.strip_suffix('!') {
        Some(body) => (body, true),
        None => (tag, false),
    };
    let mut types = Vec::new();
    for part in body.split('|').map(str::trim) {
        if part == "any" {
            return Some((TypeSet::any(), required));
        }
        types.push(JsonType::from_tag(part)?);
    }
    Some((TypeSet::of(types), required))
}

fn classify(value: &Value) -> Option<Node<'_>> {
    match value {
        Value::String(tag) => {
            let (types, required) = parse_tag(tag)?;
            Some(Node::Field(FieldSpec {
                types,
                required,
                aliases: Vec::new(),
                allowed: None,
                minimum: None,
                maximum: None,
            }))
        }
        Value::Object(map) if map.contains_key(TYPE_KEY) => {
            let (types, tag_required) = parse_tag(map.get(TYPE_KEY)?.as_str()?)?;
            Some(Node::Field(FieldSpec {
                types,
                required: tag_required
                    || map.get("required").and_then(Value::as_bool).unwrap_or(false),
                aliases: map
                    .get("aliases")
                    .and_then(Value::as_array)
                    .map(|a| a.iter().filter_map(Value::as_str).map(String::from).collect())
                    .unwrap_or_default(),
                allowed: map.get("enum").and_then(Value::as_array).cloned(),
                minimum: map.get("minimum").and_then(Value::as_f64),
                maximum: map.get("maximum").and_then(Value::as_f64),
            }))
        }
        Value::Object(map) => Some(Node::Group(map)),
        _ => None,
    }
}

fn is_valid_node(value: &Value) -> bool {
    match classify(value) {
        Some(Node::Field(_)) => true,
        Some(Node::Group(map)) => map.values().all(is_valid_node),
        None => false,
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

impl ShorthandAdapter {
    pub fn new() -> Self {
        Self
    }

    fn type_set(&self, schema: &Value) -> TypeSet {
        match classify(schema) {
            Some(Node::Field(spec)) => spec.types,
            Some(Node::Group(_)) => TypeSet::only(JsonType::Object),
            None => TypeSet::any(),
        }
    }

    /// Key of the unique field in `group` declaring `segment` as an alias.
    fn alias_match<'a>(&self, group: &'a Map<String, Value>, segment: &str) -> Option<&'a String> {
        let mut hits = group.iter().filter_map(|(key, value)| match classify(value) {
            Some(Node::Field(spec))
                if spec.aliases.iter().any(|a| a.eq_ignore_ascii_case(segment)) =>
            {
                Some(key)
            }
            _ => None,
        });
        match (hits.next(), hits.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    fn collect_leaves(&self, group: &Map<String, Value>, prefix: &str, out: &mut Vec<LeafPath>) {
        for (key, value) in group {
            let path = join(prefix, key);
            match classify(value) {
                Some(Node::Field(_)) => out.push(LeafPath {
                    path,
                    schema: value.clone(),
                }),
                Some(Node::Group(child)) => self.collect_leaves(child, &path, out),
                None => {}
            }
        }
    }

    fn check_group(
        &self,
        group: &Map<String, Value>,
        tree: Option<&Map<String, Value>>,
        prefix: &str,
        violations: &mut Vec<String>,
    ) {
        for (key, declaration) in group {
            let path = join(prefix, key);
            let value = tree.and_then(|m| m.get(key));
            match classify(declaration) {
                Some(Node::Field(spec)) => check_field(&spec, value, &path, violations),
                Some(Node::Group(child)) => match value {
                    None => self.check_group(child, None, &path, violations),
                    Some(Value::Object(map)) => self.check_group(child, Some(map), &path, violations),
                    Some(other) => violations.push(format!(
                        "{}: expected object, found {}",
                        path,
                        JsonType::of(other)
                    )),
                },
                None => violations.push(format!("{}: invalid schema declaration", path)),
            }
        }
    }
}

fn check_field(spec: &FieldSpec, value: Option<&Value>, path: &str, violations: &mut Vec<String>) {
    let Some(value) = value else {
        if spec.required {
            violations.push(format!("{}: required field is missing", path));
        }
        return;
    };

    if !spec.types.accepts(value) {
        violations.push(format!(
            "{}: expected {}, found {}",
            path,
            spec.types.describe(),
            JsonType::of(value)
        ));
        return;
    }
    if let Some(allowed) = &spec.allowed {
        if !allowed.contains(value) {
            violations.push(format!("{}: value is not one of the allowed values", path));
        }
    }
    if let Some(n) = value.as_f64() {
        if let Some(min) = spec.minimum.filter(|min| n < *min) {
            violations.push(format!("{}: value is below minimum {}", path, min));
        }
        if let Some(max) = spec.maximum.filter(|max| n > *max) {
            violations.push(format!("{}: value is above maximum {}", path, max));
        }
    }
}

impl SchemaAdapter for ShorthandAdapter {
    fn kind(&self) -> SchemaKind {
        SchemaKind::Shorthand
    }

    fn is_schema(&self, candidate: &Value) -> bool {
        let Some(map) = candidate.as_object() else {
            return false;
        };
        // JSON Schema documents would otherwise pass as groups of tags
        if map.contains_key("$schema") || map.contains_key(TYPE_KEY) {
            return false;
        }
        if map.get("type").and_then(Value::as_str) == Some("object")
            && map.get("properties").is_some_and(Value::is_object)
        {
            return false;
        }
        map.values().all(is_valid_node)
    }

    fn resolve_segments(&self, root: &Value, segments: &[&str]) -> Result<ResolvedSchemaNode> {
        let mut node = root;
        let mut canonical: Vec<String> = Vec::with_capacity(segments.len());

        for segment in segments {
            let group = match classify(node) {
                Some(Node::Group(group)) => group,
                _ => {
                    return Err(ValidationError::PathNotFound {
                        path: segments.join("."),
                        segment: (*segment).to_string(),
                        valid: Vec::new(),
                    });
                }
            };

            let names: Vec<&String> = group.keys().collect();
            let key = match_field(segment, &names)
                .or_else(|| self.alias_match(group, segment))
                .ok_or_else(|| ValidationError::PathNotFound {
                    path: segments.join("."),
                    segment: (*segment).to_string(),
                    valid: names.iter().map(|n| (*n).clone()).collect(),
                })?;

            canonical.push(key.clone());
            node = group.get(key).unwrap_or(&Value::Null);
        }

        Ok(ResolvedSchemaNode {
            schema: node.clone(),
            canonical_path: canonical.join("."),
        })
    }

    fn get_all_leaf_paths(&self, root: &Value) -> Vec<LeafPath> {
        let mut out = Vec::new();
        if let Some(group) = root.as_object() {
            self.collect_leaves(group, "", &mut out);
        }
        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }

    fn describe_type(&self, schema: &Value) -> String {
        match classify(schema) {
            Some(Node::Field(spec)) => spec.types.describe(),
            Some(Node::Group(_)) => "object".to_string(),
            None => "unknown".to_string(),
        }
    }

    fn parse_value(&self, raw: &str, schema: &Value, path: &str, mode: ParseMode) -> Result<Value> {
        parse::parse_raw(raw, &self.type_set(schema), path, mode)
    }

    fn serialize_value(&self, value: &Value, schema: &Value) -> String {
        serialize_for(value, self.type_set(schema) == TypeSet::only(JsonType::Integer))
    }

    fn validate(&self, root: &Value, tree: &Value) -> Result<()> {
        let group = root.as_object().ok_or_else(|| ValidationError::InvalidSchema {
            message: "shorthand schema root must be an object".to_string(),
        })?;

        let mut violations = Vec::new();
        match tree {
            Value::Object(map) => self.check_group(group, Some(map), "", &mut violations),
            other => violations.push(format!("(root): expected object, found {}", JsonType::of(other))),
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ConstraintViolation { violations })
        }
    }
}
