//! Output rendering
//!
//! - `env`: one `KEY=value` line per leaf, sorted by key
//! - `json`: pretty, two-space indent, trailing newline
//! - `yaml`

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Target text format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Env,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Render `tree` in this format.
    pub fn render(&self, tree: &Value) -> Result<String> {
        match self {
            Self::Env => Ok(to_env(tree)),
            Self::Json => to_json(tree),
            Self::Yaml => serde_yaml::to_string(tree).map_err(|e| Error::Format {
                format: self.as_str().into(),
                message: e.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "env" | "dotenv" => Ok(Self::Env),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::InvalidSetting {
                key: "output.format".into(),
                value: s.into(),
                expected: "env, json or yaml".into(),
            }),
        }
    }
}

/// `database.host` -> `DATABASE_HOST`
pub fn env_key(path: &str) -> String {
    path.chars()
        .map(|c| match c {
            '.' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

/// Quote `value` if it contains whitespace, `#`, `=`, `$` or a quote.
pub fn env_value(value: &str) -> String {
    let needs_quotes = value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '#' | '=' | '$' | '"' | '\''));
    if needs_quotes { quote(value) } else { value.to_string() }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn to_env(tree: &Value) -> String {
    let mut lines: BTreeMap<String, String> = BTreeMap::new();
    for (path, value) in strata_schema::flatten(tree) {
        let key = env_key(&path);
        let rendered = match &value {
            Value::String(s) => env_value(s),
            Value::Null => String::new(),
            Value::Bool(_) | Value::Number(_) => value.to_string(),
            // Structures are always quoted
            Value::Array(_) | Value::Object(_) => quote(&value.to_string()),
        };
        if lines.insert(key.clone(), rendered).is_some() {
            tracing::warn!(key = %key, path = %path, "Two paths map to the same env key; keeping the last");
        }
    }

    lines
        .into_iter()
        .map(|(key, value)| format!("{key}={value}\n"))
        .collect()
}

fn to_json(tree: &Value) -> Result<String> {
    let mut out = serde_json::to_string_pretty(tree).map_err(|e| Error::Format {
        format: "json".into(),
        message: e.to_string(),
    })?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn env_lines_are_sorted() {
        let tree = json!({"database": {"port": 5432, "host": "localhost"}});
        assert_eq!(
            OutputFormat::Env.render(&tree).unwrap(),
            "DATABASE_HOST=localhost\nDATABASE_PORT=5432\n"
        );
    }

    #[rstest]
    #[case("hello world", "\"hello world\"")]
    #[case("say \"hi\"", "\"say \\\"hi\\\"\"")]
    #[case("a#b", "\"a#b\"")]
    #[case("k=v", "\"k=v\"")]
    #[case("$HOME", "\"$HOME\"")]
    #[case("line1\nline2", "\"line1\\nline2\"")]
    #[case("back\\slash x", "\"back\\\\slash x\"")]
    #[case("plain", "plain")]
    #[case("back\\slash", "back\\slash")]
    fn env_quoting(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(env_value(raw), expected);
    }

    #[test]
    fn env_value_with_spaces_under_nested_key() {
        let tree = json!({"my": {"value": "hello world"}});
        assert_eq!(
            OutputFormat::Env.render(&tree).unwrap(),
            "MY_VALUE=\"hello world\"\n"
        );
    }

    #[test]
    fn env_structures_are_minified_and_quoted() {
        let tree = json!({"tags": ["a", "b"], "empty": {}, "none": null, "on": true});
        assert_eq!(
            OutputFormat::Env.render(&tree).unwrap(),
            "EMPTY=\"{}\"\nNONE=\nON=true\nTAGS=\"[\\\"a\\\",\\\"b\\\"]\"\n"
        );
    }

    #[test]
    fn env_key_replaces_dashes() {
        assert_eq!(env_key("feature-flags.new_ui"), "FEATURE_FLAGS_NEW_UI");
    }

    #[test]
    fn json_is_pretty_with_trailing_newline() {
        let out = OutputFormat::Json.render(&json!({"a": {"b": 1}})).unwrap();
        assert_eq!(out, "{\n  \"a\": {\n    \"b\": 1\n  }\n}\n");
    }

    #[test]
    fn yaml_renders_mapping() {
        let out = OutputFormat::Yaml.render(&json!({"a": {"b": 1}})).unwrap();
        assert_eq!(out, "a:\n  b: 1\n");
    }

    #[rstest]
    #[case("ENV", OutputFormat::Env)]
    #[case("json", OutputFormat::Json)]
    #[case("yml", OutputFormat::Yaml)]
    fn parses_format_names(#[case] name: &str, #[case] expected: OutputFormat) {
        assert_eq!(name.parse::<OutputFormat>().unwrap(), expected);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = "toml".parse::<OutputFormat>().unwrap_err();
        assert_eq!(err.code(), "INVALID_SETTING");
    }
}
