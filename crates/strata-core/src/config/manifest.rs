//! Manifest parsing for config.toml files

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_provider::GuardConfig;
use strata_schema::{ParseMode, SchemaKind};
use strata_template::{DEFAULT_BINARY, DEFAULT_TIMEOUT_MS};

use crate::OutputFormat;

fn default_provider() -> String {
    "file".to_string()
}

fn default_binary() -> String {
    DEFAULT_BINARY.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// `[core]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreSection {
    /// Store namespace prefix, e.g. `/acme`
    #[serde(default)]
    pub prefix: String,
    /// Primary source
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub env: Option<String>,
    /// Registry name of the provider
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub parse_mode: ParseMode,
}

impl Default for CoreSection {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            service: None,
            env: None,
            provider: default_provider(),
            strict: false,
            parse_mode: ParseMode::default(),
        }
    }
}

/// `[schema]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSection {
    /// Schema document, relative to the project root
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub kind: SchemaKind,
    /// Pinned schema hash; a different computed hash is reported as drift
    #[serde(default)]
    pub hash: Option<String>,
}

/// `[template]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSection {
    /// Template file; without one the merged tree is exported as is
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_binary")]
    pub binary: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Non-sensitive values passed inline to the evaluator
    #[serde(default)]
    pub defaults: Option<Value>,
}

impl Default for TemplateSection {
    fn default() -> Self {
        Self {
            path: None,
            binary: default_binary(),
            timeout_ms: default_timeout_ms(),
            defaults: None,
        }
    }
}

/// `[sources]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourcesSection {
    /// Services merged after the primary one, in this order
    #[serde(default)]
    pub extra: Vec<String>,
}

/// `[output]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Project configuration parsed from config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub core: CoreSection,
    #[serde(default)]
    pub schema: SchemaSection,
    #[serde(default)]
    pub template: TemplateSection,
    #[serde(default)]
    pub sources: SourcesSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub guards: GuardConfig,
    /// `[provider.<name>]` option tables
    #[serde(default)]
    pub provider: BTreeMap<String, toml::Table>,
}

impl Manifest {
    /// Parse a single manifest from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use strata_core::config::Manifest;
    ///
    /// let manifest = Manifest::parse(r#"
    /// [core]
    /// service = "api"
    ///
    /// [sources]
    /// extra = ["shared"]
    /// "#).unwrap();
    ///
    /// assert_eq!(manifest.core.service.as_deref(), Some("api"));
    /// assert_eq!(manifest.core.provider, "file");
    /// ```
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply command-line overrides.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(env) = &overrides.env {
            self.core.env = Some(env.clone());
        }
        if let Some(service) = &overrides.service {
            self.core.service = Some(service.clone());
        }
        if let Some(provider) = &overrides.provider {
            self.core.provider = provider.clone();
        }
        if let Some(strict) = overrides.strict {
            self.core.strict = strict;
        }
        if let Some(mode) = overrides.parse_mode {
            self.core.parse_mode = mode;
        }
        if let Some(format) = overrides.format {
            self.output.format = format;
        }
        if let Some(sources) = &overrides.sources {
            self.sources.extra = sources.clone();
        }
        if let Some(template) = &overrides.template {
            self.template.path = Some(template.clone());
        }
        if overrides.no_template {
            self.template.path = None;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.template.timeout_ms = timeout_ms;
        }
        self.guards.allow_protected = overrides.allow_protected;
    }

    /// `[provider.<name>]` values as strings.
    pub fn provider_options(&self, name: &str) -> BTreeMap<String, String> {
        self.provider
            .get(name)
            .map(|table| {
                table
                    .iter()
                    .map(|(key, value)| {
                        let text = match value {
                            toml::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (key.clone(), text)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub env: Option<String>,
    pub service: Option<String>,
    pub provider: Option<String>,
    pub strict: Option<bool>,
    pub parse_mode: Option<ParseMode>,
    pub format: Option<OutputFormat>,
    /// Replaces `[sources] extra`
    pub sources: Option<Vec<String>>,
    pub template: Option<PathBuf>,
    /// Skip the template step even if one is configured
    pub no_template: bool,
    pub timeout_ms: Option<u64>,
    pub allow_protected: bool,
}
