//! Ordered deep merge of named sources with conflict tracking
//!
//! Sources are folded left to right: the first tree is the starting
//! accumulator and every later tree is merged into it, so later sources win.
//! Objects merge key by key; any other pair of values is replaced wholesale.
//! A replacement involving an array is always a conflict. Other replacements
//! conflict only when the two sides differ. Integers and floats share the
//! JSON `number` type.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use strata_schema::{JsonType, ValidationError};

/// Why a merge step replaced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    /// Same JSON type, different value
    Override,
    /// Different JSON types
    TypeMismatch,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::TypeMismatch => "type-mismatch",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One replaced value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeConflict {
    pub path: String,
    /// Source that contributed the replaced value
    pub source_a: String,
    /// Source whose value won
    pub source_b: String,
    pub value_a: Value,
    pub value_b: Value,
    pub kind: ConflictKind,
}

/// Merged tree plus every conflict in the order it was found.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MergeResult {
    pub merged: Value,
    pub conflicts: Vec<MergeConflict>,
}

impl MergeResult {
    pub fn type_mismatches(&self) -> impl Iterator<Item = &MergeConflict> {
        self.conflicts
            .iter()
            .filter(|c| c.kind == ConflictKind::TypeMismatch)
    }
}

/// Merge `sources` in order.
///
/// With `strict`, any type mismatch fails the whole merge with
/// [`ValidationError::TypeMismatch`] listing every mismatched path and both
/// contributing sources. Overrides never fail. An empty input merges to an
/// empty object.
pub fn merge_sources<S: AsRef<str>>(
    sources: &[(S, Value)],
    strict: bool,
) -> strata_schema::Result<MergeResult> {
    let mut sources = sources.iter();
    let Some((first_name, first_tree)) = sources.next() else {
        return Ok(MergeResult {
            merged: Value::Object(Default::default()),
            conflicts: Vec::new(),
        });
    };

    let mut merger = Merger::new(first_name.as_ref());
    let mut merged = first_tree.clone();
    for (name, tree) in sources {
        merger.merge_value(&mut merged, tree, "", name.as_ref());
    }

    let result = MergeResult {
        merged,
        conflicts: merger.conflicts,
    };

    if strict {
        let mismatches: Vec<String> = result
            .type_mismatches()
            .map(|c| {
                format!(
                    "{}: {} ({}) vs {} ({})",
                    display_path(&c.path),
                    c.source_a,
                    json_class(&c.value_a),
                    c.source_b,
                    json_class(&c.value_b)
                )
            })
            .collect();
        if !mismatches.is_empty() {
            return Err(ValidationError::TypeMismatch { mismatches });
        }
    }

    Ok(result)
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}

struct Merger {
    conflicts: Vec<MergeConflict>,
    provenance: Provenance,
}

impl Merger {
    fn new(first: &str) -> Self {
        Self {
            conflicts: Vec::new(),
            provenance: Provenance::new(first),
        }
    }

    fn merge_value(&mut self, acc: &mut Value, incoming: &Value, path: &str, source: &str) {
        if let (Value::Object(base), Value::Object(overlay)) = (&mut *acc, incoming) {
            for (key, value) in overlay {
                let child = join(path, key);
                match base.get_mut(key) {
                    Some(existing) => self.merge_value(existing, value, &child, source),
                    None => {
                        base.insert(key.clone(), value.clone());
                        self.provenance.set(&child, source);
                    }
                }
            }
            return;
        }

        if let Some(kind) = conflict_kind(acc, incoming) {
            self.conflicts.push(MergeConflict {
                path: path.to_string(),
                source_a: self.provenance.origin(path).to_string(),
                source_b: source.to_string(),
                value_a: acc.clone(),
                value_b: incoming.clone(),
                kind,
            });
        }
        *acc = incoming.clone();
        self.provenance.set(path, source);
    }
}

fn json_class(value: &Value) -> JsonType {
    JsonType::of(value).json_class()
}

fn conflict_kind(current: &Value, incoming: &Value) -> Option<ConflictKind> {
    match (current.is_array(), incoming.is_array()) {
        (true, true) => return Some(ConflictKind::Override),
        (true, false) | (false, true) => return Some(ConflictKind::TypeMismatch),
        (false, false) => {}
    }
    if json_class(current) != json_class(incoming) {
        Some(ConflictKind::TypeMismatch)
    } else if current != incoming {
        Some(ConflictKind::Override)
    } else {
        None
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Which source last wrote each subtree. A path's origin is the entry for the
/// path itself or its nearest recorded ancestor; the root entry (`""`) is the
/// first source.
struct Provenance {
    origins: BTreeMap<String, String>,
}

impl Provenance {
    fn new(first: &str) -> Self {
        Self {
            origins: BTreeMap::from([(String::new(), first.to_string())]),
        }
    }

    fn set(&mut self, path: &str, source: &str) {
        if path.is_empty() {
            self.origins.clear();
        } else {
            let nested = format!("{path}.");
            self.origins.retain(|key, _| !key.starts_with(&nested));
        }
        self.origins.insert(path.to_string(), source.to_string());
    }

    fn origin(&self, path: &str) -> &str {
        let mut current = path;
        loop {
            if let Some(source) = self.origins.get(current) {
                return source;
            }
            match current.rfind('.') {
                Some(idx) => current = &current[..idx],
                None if !current.is_empty() => current = "",
                None => return "",
            }
        }
    }
}
