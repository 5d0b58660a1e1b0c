//! Import command implementation

use std::path::Path;

use colored::Colorize;
use strata_core::Workflow;

use super::{print_json, print_warnings};
use crate::error::Result;

pub async fn run_import(workflow: &Workflow, document: &Path, json: bool) -> Result<()> {
    let report = workflow.import(document).await?;
    if json {
        return print_json(&report);
    }

    print_warnings(&report.warnings);
    println!(
        "{} {} keys from {}",
        "Imported".green().bold(),
        report.written.len(),
        document.display()
    );
    for path in &report.written {
        println!("  {} {}", "+".green(), path.cyan());
    }
    Ok(())
}
