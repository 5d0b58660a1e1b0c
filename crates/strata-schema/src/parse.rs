//! Schema-directed parsing of raw provider strings
//!
//! Both adapters reduce a sub-schema to a [`TypeSet`] and hand it here, so
//! `auto` mode always consults the schema before inferring anything.

use serde_json::{Number, Value};

use crate::{JsonType, ParseMode, Result, TypeSet, ValidationError};

/// Interpret `raw` under the types a sub-schema admits.
pub fn parse_raw(raw: &str, allowed: &TypeSet, path: &str, mode: ParseMode) -> Result<Value> {
    let failed = |expected: String| ValidationError::ParseFailed {
        path: path.to_string(),
        expected,
        mode: mode.to_string(),
        length: raw.chars().count(),
    };

    let explicit = match mode {
        ParseMode::Auto => return parse_auto(raw, allowed).ok_or_else(|| failed(allowed.describe())),
        ParseMode::String => Some(Value::String(raw.to_string())),
        ParseMode::Integer => parse_integer(raw),
        ParseMode::Float => parse_float(raw),
        ParseMode::Boolean => parse_boolean(raw),
        ParseMode::Json => serde_json::from_str(raw).ok(),
    };

    match explicit {
        None => Err(failed(mode.to_string())),
        Some(value) if allowed.accepts(&value) => Ok(value),
        Some(_) => Err(failed(allowed.describe())),
    }
}

fn parse_auto(raw: &str, allowed: &TypeSet) -> Option<Value> {
    if allowed.is_any() {
        return Some(infer(raw));
    }
    allowed.types().into_iter().find_map(|ty| parse_as(raw, ty))
}

/// Inference for fields that admit any type.
fn infer(raw: &str) -> Value {
    let trimmed = raw.trim();
    match trimmed {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Some(number) = parse_number(trimmed) {
        return number;
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return value;
        }
    }
    Value::String(raw.to_string())
}

fn parse_as(raw: &str, ty: JsonType) -> Option<Value> {
    match ty {
        JsonType::Integer => parse_integer(raw),
        JsonType::Number => parse_number(raw),
        JsonType::Boolean => parse_boolean(raw),
        JsonType::Object => parse_json(raw).filter(Value::is_object),
        JsonType::Array => parse_json(raw).filter(Value::is_array),
        JsonType::Null => (raw.trim() == "null").then_some(Value::Null),
        JsonType::String => Some(Value::String(raw.to_string())),
    }
}

fn parse_integer(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::from(i));
    }
    trimmed.parse::<u64>().ok().map(Value::from)
}

fn parse_float(raw: &str) -> Option<Value> {
    let f = raw.trim().parse::<f64>().ok()?;
    Number::from_f64(f).map(Value::Number)
}

/// Integers stay integers; anything else finite becomes a float.
fn parse_number(raw: &str) -> Option<Value> {
    parse_integer(raw).or_else(|| parse_float(raw))
}

fn parse_boolean(raw: &str) -> Option<Value> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(Value::Bool(true)),
        "false" | "no" | "off" | "0" => Some(Value::Bool(false)),
        _ => None,
    }
}

fn parse_json(raw: &str) -> Option<Value> {
    serde_json::from_str(raw.trim()).ok()
}
