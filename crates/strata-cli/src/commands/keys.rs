//! Single-key commands: get, set, delete and list

use colored::Colorize;
use serde_json::{Value, json};
use strata_core::Workflow;

use super::print_json;
use crate::error::Result;

/// Print one typed value. Strings print bare so the output can be piped.
pub async fn run_get(workflow: &Workflow, path: &str, json: bool) -> Result<()> {
    let result = workflow.get(path).await?;
    if json {
        return print_json(&result);
    }
    println!("{}", display_value(&result.value));
    Ok(())
}

pub async fn run_set(workflow: &Workflow, path: &str, raw: &str, json: bool) -> Result<()> {
    let result = workflow.set(path, raw).await?;
    if json {
        return print_json(&result);
    }
    println!(
        "{} {} = {}",
        "Set".green().bold(),
        result.path.cyan(),
        result.stored
    );
    Ok(())
}

pub async fn run_delete(workflow: &Workflow, path: &str, json: bool) -> Result<()> {
    let deleted = workflow.delete(path).await?;
    if json {
        return print_json(&json!({ "deleted": deleted }));
    }
    println!("{} {}", "Deleted".green().bold(), deleted.cyan());
    Ok(())
}

/// Schema keys with presence markers, then stored keys outside the schema.
pub async fn run_list(workflow: &Workflow, json: bool) -> Result<()> {
    let entries = workflow.list().await?;
    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("  {}", "No keys".dimmed());
        return Ok(());
    }
    for entry in &entries {
        let marker = match (entry.in_schema, entry.present) {
            (true, true) => "+".green(),
            (true, false) => "-".dimmed(),
            (false, _) => "?".yellow(),
        };
        println!(
            "  {} {} ({})",
            marker,
            entry.path.cyan(),
            entry.type_tag.dimmed()
        );
    }
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
