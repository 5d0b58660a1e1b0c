//! strata CLI
//!
//! Resolves a service's configuration from its secret store, validated
//! against a schema, and renders it as env, JSON or YAML.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use strata_core::{ConfigResolver, Workflow};
use strata_provider::ProviderRegistry;
use strata_schema::ParseMode;

use cli::{Cli, Commands, SchemaAction};
use error::{CliError, Result};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let json = cli.json;
    if let Err(e) = run(cli) {
        if json {
            println!("{}", e.to_json());
        } else {
            eprintln!("{}: {}", format!("error[{}]", e.code()).red().bold(), e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute(cli))
}

async fn execute(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let root = context::project_root(cli.project.as_deref(), &cwd);
    tracing::debug!(root = %root.display(), "Resolved project root");

    let mut overrides = cli.overrides.to_overrides()?;
    if let Commands::Set {
        mode: Some(mode), ..
    } = &cli.command
    {
        overrides.parse_mode = Some(mode.parse::<ParseMode>().map_err(CliError::user)?);
    }

    let config = ConfigResolver::new(root).resolve_with(&overrides)?;
    let workflow = Workflow::new(config, ProviderRegistry::with_builtins());

    match cli.command {
        Commands::Export { output } => {
            let output = output.map(|p| if p.is_absolute() { p } else { cwd.join(p) });
            commands::run_export(&workflow, output.as_deref(), cli.json).await
        }
        Commands::Get { path } => commands::run_get(&workflow, &path, cli.json).await,
        Commands::Set { path, value, .. } => {
            commands::run_set(&workflow, &path, &value, cli.json).await
        }
        Commands::Delete { path } => commands::run_delete(&workflow, &path, cli.json).await,
        Commands::List => commands::run_list(&workflow, cli.json).await,
        Commands::Import { file } => {
            let file = if file.is_absolute() { file } else { cwd.join(file) };
            commands::run_import(&workflow, &file, cli.json).await
        }
        Commands::Schema {
            action: SchemaAction::Hash,
        } => commands::run_schema_hash(&workflow, cli.json),
    }
}
