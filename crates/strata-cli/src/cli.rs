//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use strata_core::Overrides;

/// strata - Resolve service configuration from secret stores against a schema
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Report results and errors as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long = "project", global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags that override `.strata/config.toml`
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideArgs {
    /// Environment to resolve (dev, staging, prod, ...)
    #[arg(short, long, global = true, env = "STRATA_ENV")]
    pub env: Option<String>,

    /// Service whose namespace is the primary source
    #[arg(short, long, global = true)]
    pub service: Option<String>,

    /// Provider name from the registry (memory, file)
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Fail on unknown keys, invalid values and type mismatches
    #[arg(long, global = true)]
    pub strict: bool,

    /// Output format: env, json or yaml
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Source service merged in order before the primary (repeatable)
    #[arg(long = "source", global = true, value_name = "SERVICE")]
    pub sources: Vec<String>,

    /// Template file applied to the merged tree
    #[arg(long, global = true, conflicts_with = "no_template")]
    pub template: Option<PathBuf>,

    /// Skip the configured template
    #[arg(long, global = true)]
    pub no_template: bool,

    /// Template evaluation timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Allow writes to protected environments
    #[arg(long, global = true)]
    pub allow_protected: bool,
}

impl OverrideArgs {
    /// Convert flags into manifest overrides. Unset flags leave the
    /// manifest untouched.
    pub fn to_overrides(&self) -> crate::error::Result<Overrides> {
        let format = self.format.as_deref().map(str::parse).transpose()?;
        Ok(Overrides {
            env: self.env.clone(),
            service: self.service.clone(),
            provider: self.provider.clone(),
            strict: self.strict.then_some(true),
            parse_mode: None,
            format,
            sources: (!self.sources.is_empty()).then(|| self.sources.clone()),
            template: self.template.clone(),
            no_template: self.no_template,
            timeout_ms: self.timeout_ms,
            allow_protected: self.allow_protected,
        })
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fetch, merge, template, validate and render the configuration
    ///
    /// Examples:
    ///   strata export --env dev
    ///   strata export --env prod --source shared --format json
    ///   strata export --env dev --output .env
    Export {
        /// Write the rendered configuration to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print one typed value from the primary source
    Get {
        /// Dot path of the key (e.g. database.port)
        path: String,
    },

    /// Parse a value under the schema and store it
    Set {
        /// Dot path of the key
        path: String,

        /// Raw value
        value: String,

        /// Parse mode: auto, string, integer, float, boolean or json
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// Remove one key from the primary source
    Delete {
        /// Dot path of the key
        path: String,
    },

    /// List schema keys and their presence in the primary source
    List,

    /// Write every leaf of a JSON, YAML or TOML document to the primary source
    Import {
        /// Document to import
        file: PathBuf,
    },

    /// Schema utilities
    Schema {
        #[command(subcommand)]
        action: SchemaAction,
    },
}

/// Schema subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SchemaAction {
    /// Print the sha256 hash of the configured schema
    Hash,
}
