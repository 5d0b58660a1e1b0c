//! JSON-level value types shared by both schema adapters

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;

/// A JSON Schema primitive type.
///
/// The declaration order doubles as the auto-parse preference order: the
/// most specific interpretation of a raw string is tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JsonType {
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    Null,
    String,
}

impl JsonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
            Self::String => "string",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "null" => Some(Self::Null),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    /// The most specific type describing `value`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// JSON-level type class: integers are numbers.
    pub fn json_class(&self) -> Self {
        match self {
            Self::Integer => Self::Number,
            other => *other,
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of types a sub-schema admits. `None` means any type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeSet(Option<BTreeSet<JsonType>>);

impl TypeSet {
    pub fn any() -> Self {
        Self(None)
    }

    pub fn only(ty: JsonType) -> Self {
        Self(Some(BTreeSet::from([ty])))
    }

    pub fn of(types: impl IntoIterator<Item = JsonType>) -> Self {
        Self(Some(types.into_iter().collect()))
    }

    pub fn is_any(&self) -> bool {
        self.0.is_none()
    }

    /// Types in auto-parse preference order; empty for "any".
    pub fn types(&self) -> Vec<JsonType> {
        self.0
            .as_ref()
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Merge another set into this one (union).
    pub fn union(self, other: TypeSet) -> TypeSet {
        match (self.0, other.0) {
            (Some(mut a), Some(b)) => {
                a.extend(b);
                Self(Some(a))
            }
            _ => Self::any(),
        }
    }

    /// Whether `value` is admitted. Integers satisfy `number`.
    pub fn accepts(&self, value: &Value) -> bool {
        let Some(set) = &self.0 else {
            return true;
        };
        let actual = JsonType::of(value);
        set.contains(&actual) || (actual == JsonType::Integer && set.contains(&JsonType::Number))
    }

    pub fn describe(&self) -> String {
        match &self.0 {
            None => "any".to_string(),
            Some(set) => set
                .iter()
                .map(JsonType::as_str)
                .collect::<Vec<_>>()
                .join("|"),
        }
    }
}
