//! Scenario tests that run whole exports across crates: layered project
//! configuration, both schema kinds, multi-source merges, injected
//! providers and template evaluation.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use strata_core::{ConfigResolver, ConflictKind, Overrides, Warning, Workflow};
use strata_provider::{MemoryProvider, Provider, ProviderContext, ProviderRegistry};
use strata_test_utils::TestProject;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn db_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "database": {
                "type": "object",
                "properties": {
                    "host": {"type": "string"},
                    "port": {"type": "integer"}
                }
            }
        }
    })
}

fn in_env(env: &str) -> Overrides {
    Overrides {
        env: Some(env.into()),
        ..Overrides::default()
    }
}

/// Resolve `project` with an isolated global layer under `.global/`.
fn workflow(project: &TestProject, overrides: &Overrides) -> Workflow {
    let config =
        ConfigResolver::with_global_config_dir(project.root(), project.path(".global"))
            .resolve_with(overrides)
            .unwrap();
    Workflow::new(config, ProviderRegistry::with_builtins())
}

// =============================================================================
// Configuration layering
// =============================================================================

#[tokio::test]
async fn global_project_and_local_layers_combine() {
    let project = TestProject::new();
    project.init_file_project(&db_schema(), "");
    project.write_file(".global/config.toml", "[output]\nformat = \"yaml\"\n");
    project.write_local_config("[core]\nenv = \"staging\"\n");
    project.write_store(&[
        ("/acme/api/staging/database/host", "staging-db"),
        ("/acme/api/staging/database/port", "5432"),
        ("/acme/api/dev/database/host", "dev-db"),
    ]);

    let result = workflow(&project, &Overrides::default()).export().await.unwrap();

    let rendered: Value = serde_yaml::from_str(&result.formatted).unwrap();
    assert_eq!(
        rendered,
        json!({"database": {"host": "staging-db", "port": 5432}})
    );
}

#[tokio::test]
async fn flags_override_every_layer() {
    let project = TestProject::new();
    project.init_file_project(&db_schema(), "[output]\nformat = \"yaml\"\n");
    project.write_local_config("[core]\nenv = \"staging\"\n");
    project.write_store(&[("/acme/api/dev/database/host", "dev-db")]);

    let overrides = Overrides {
        format: Some("env".parse().unwrap()),
        ..in_env("dev")
    };
    let result = workflow(&project, &overrides).export().await.unwrap();
    assert_eq!(result.formatted, "DATABASE_HOST=dev-db\n");
}

// =============================================================================
// Schema kinds
// =============================================================================

#[tokio::test]
async fn shorthand_schema_from_yaml_resolves_aliases() {
    let project = TestProject::new();
    project.write_file(
        "schema.yaml",
        "database:\n  host: string!\n  port:\n    $type: integer\n    aliases: [pgport]\n  ssl: boolean\n",
    );
    project.write_config(
        "[core]\nprefix = \"/acme\"\nservice = \"api\"\n\n\
         [schema]\npath = \"schema.yaml\"\nkind = \"shorthand\"\n\n\
         [output]\nformat = \"json\"\n",
    );
    project.write_store(&[
        ("/acme/api/dev/Database/Host", "db.internal"),
        ("/acme/api/dev/database/pgport", "6543"),
        ("/acme/api/dev/database/ssl", "true"),
    ]);

    let result = workflow(&project, &in_env("dev")).export().await.unwrap();

    assert_eq!(
        result.config,
        json!({"database": {"host": "db.internal", "port": 6543, "ssl": true}})
    );
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[tokio::test]
async fn shorthand_required_field_fails_final_validation() {
    let project = TestProject::new();
    project.write_schema("schema.json", &json!({"database": {"host": "string!"}}));
    project.write_config(
        "[core]\nprefix = \"/acme\"\nservice = \"api\"\n\n\
         [schema]\npath = \"schema.json\"\nkind = \"shorthand\"\n",
    );
    project.write_store(&[]);

    let err = workflow(&project, &in_env("dev")).export().await.unwrap_err();
    assert_eq!(err.code(), "CONSTRAINT_VIOLATION");
    assert!(err.to_string().contains("database.host"));
}

// =============================================================================
// Multi-source merges
// =============================================================================

#[tokio::test]
async fn conflicts_accumulate_across_three_sources() {
    let project = TestProject::new();
    project.init_file_project(&db_schema(), "[sources]\nextra = [\"shared\", \"platform\"]\n");
    project.write_store(&[
        ("/acme/api/dev/database/host", "api-db"),
        ("/acme/shared/dev/database/host", "shared-db"),
        ("/acme/platform/dev/database/host", "platform-db"),
        ("/acme/platform/dev/database/port", "5432"),
    ]);

    let result = workflow(&project, &in_env("dev")).export().await.unwrap();

    assert_eq!(result.config["database"]["host"], "platform-db");
    let steps: Vec<(&str, &str)> = result
        .conflicts
        .iter()
        .map(|c| (c.source_a.as_str(), c.source_b.as_str()))
        .collect();
    assert_eq!(steps, vec![("api", "shared"), ("shared", "platform")]);
    assert!(result.conflicts.iter().all(|c| c.kind == ConflictKind::Override));
    assert_eq!(
        result
            .warnings
            .iter()
            .filter(|w| matches!(w, Warning::Conflict { .. }))
            .count(),
        2
    );
}

#[tokio::test]
async fn strict_mode_rejects_type_mismatch_between_sources() {
    let project = TestProject::new();
    project.init_file_project(
        &json!({
            "type": "object",
            "properties": {"port": {"type": ["integer", "string"]}}
        }),
        "[sources]\nextra = [\"shared\"]\n",
    );
    project.write_store(&[
        ("/acme/api/dev/port", "5432"),
        ("/acme/shared/dev/port", "unix-socket"),
    ]);

    let lenient = workflow(&project, &in_env("dev")).export().await.unwrap();
    assert_eq!(lenient.config, json!({"port": "unix-socket"}));
    assert_eq!(lenient.conflicts[0].kind, ConflictKind::TypeMismatch);

    let strict = Overrides {
        strict: Some(true),
        ..in_env("dev")
    };
    let err = workflow(&project, &strict).export().await.unwrap_err();
    assert_eq!(err.code(), "MERGE_TYPE_MISMATCH");
}

// =============================================================================
// Provider injection
// =============================================================================

#[tokio::test]
async fn registered_provider_backs_every_operation() {
    let project = TestProject::new();
    project.write_schema("schema.json", &db_schema());
    project.write_config(
        "[core]\nprefix = \"/acme\"\nservice = \"api\"\nprovider = \"shared-memory\"\n\n\
         [schema]\npath = \"schema.json\"\n",
    );

    let store = MemoryProvider::new();
    let mut registry = ProviderRegistry::new();
    let handle = store.clone();
    registry.register("shared-memory", move |_| Ok(Box::new(handle.clone())));

    let config = ConfigResolver::with_global_config_dir(project.root(), project.path(".global"))
        .resolve_with(&in_env("dev"))
        .unwrap();
    let workflow = Workflow::new(config, registry);

    workflow.set("Database.Port", "5433").await.unwrap();
    workflow.set("database.host", "mem-db").await.unwrap();

    let ctx = ProviderContext::new("/acme", "api", "dev");
    let kv = store.fetch(&ctx).await.unwrap();
    assert_eq!(kv.get("database.port").map(String::as_str), Some("5433"));

    let result = workflow.export().await.unwrap();
    assert_eq!(result.formatted, "DATABASE_HOST=mem-db\nDATABASE_PORT=5433\n");
}

// =============================================================================
// Import
// =============================================================================

#[tokio::test]
async fn toml_import_round_trips_through_export() {
    let project = TestProject::new();
    project.init_file_project(&db_schema(), "[output]\nformat = \"json\"\n");
    let document = project.write_file(
        "seed.toml",
        "[database]\nhost = \"seeded\"\nport = 7000\n",
    );

    let flow = workflow(&project, &in_env("dev"));
    let report = flow.import(&document).await.unwrap();
    assert_eq!(report.written, vec!["database.host", "database.port"]);

    let result = flow.export().await.unwrap();
    assert_eq!(
        result.config,
        json!({"database": {"host": "seeded", "port": 7000}})
    );
}

// =============================================================================
// Template evaluation
// =============================================================================

#[cfg(unix)]
#[tokio::test]
async fn template_restructures_merged_tree() {
    use strata_test_utils::evaluator;

    let project = TestProject::new();
    let bin = evaluator::wrapping(project.root());
    project.init_file_project(
        &json!({
            "type": "object",
            "properties": {
                "environment": {"type": "string"},
                "rendered": {"type": "object"}
            },
            "required": ["environment", "rendered"]
        }),
        &format!(
            "[template]\npath = \"config.jsonnet\"\nbinary = \"{}\"\n\n[output]\nformat = \"json\"\n",
            bin.display()
        ),
    );
    project.write_file("config.jsonnet", "{}\n");
    project.write_store(&[("/acme/api/dev/region", "eu-west-1")]);

    let result = workflow(&project, &in_env("dev")).export().await.unwrap();

    assert_eq!(
        result.config,
        json!({"environment": "dev", "rendered": {"region": "eu-west-1"}})
    );
}
