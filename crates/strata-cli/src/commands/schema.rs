//! Schema command implementation

use serde_json::json;
use strata_core::Workflow;

use super::print_json;
use crate::error::Result;

pub fn run_schema_hash(workflow: &Workflow, json: bool) -> Result<()> {
    let hash = workflow.schema_hash()?;
    if json {
        return print_json(&json!({ "hash": hash }));
    }
    println!("{hash}");
    Ok(())
}
