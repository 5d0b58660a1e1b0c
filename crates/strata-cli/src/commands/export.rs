//! Export command implementation

use std::path::Path;

use colored::Colorize;
use strata_core::Workflow;

use super::{print_json, print_warnings};
use crate::error::Result;

/// Run the export pipeline and print or write the rendered configuration.
pub async fn run_export(workflow: &Workflow, output: Option<&Path>, json: bool) -> Result<()> {
    let result = workflow.export().await?;

    if let Some(path) = output {
        strata_fs::write_text(path, &result.formatted)?;
        tracing::debug!(path = %path.display(), "Wrote export");
    }

    if json {
        return print_json(&result);
    }

    print_warnings(&result.warnings);
    match output {
        Some(path) => eprintln!(
            "{} {} ({} keys)",
            "Wrote".green().bold(),
            path.display(),
            leaf_count(&result.config)
        ),
        None => print!("{}", result.formatted),
    }
    Ok(())
}

fn leaf_count(tree: &serde_json::Value) -> usize {
    match tree {
        serde_json::Value::Object(map) if !map.is_empty() => map.values().map(leaf_count).sum(),
        _ => 1,
    }
}
