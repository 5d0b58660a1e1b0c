//! Exports through the file provider, config resolver and a fake evaluator
#![cfg(unix)]

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use strata_core::{ConfigResolver, Overrides, Workflow};
use strata_provider::ProviderRegistry;
use strata_test_utils::{TestProject, evaluator};

fn schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "database": {
                "type": "object",
                "properties": {
                    "host": {"type": "string"},
                    "port": {"type": "integer"}
                },
                "required": ["host"]
            }
        }
    })
}

fn workflow(project: &TestProject, overrides: Overrides) -> Workflow {
    let config = ConfigResolver::with_global_config_dir(project.root(), project.path("no-global"))
        .resolve_with(&overrides)
        .unwrap();
    Workflow::new(config, ProviderRegistry::with_builtins())
}

fn dev() -> Overrides {
    Overrides {
        env: Some("dev".into()),
        ..Overrides::default()
    }
}

fn seeded_project(template_config: &str) -> TestProject {
    let project = TestProject::new();
    project.init_file_project(&schema(), template_config);
    project.write_store(&[
        ("/acme/api/dev/database/host", "localhost"),
        ("/acme/api/dev/database/port", "5432"),
    ]);
    project.write_file("config.jsonnet", "std.extVar('secrets')\n");
    project
}

#[tokio::test]
async fn identity_template_exports_env() {
    let project = TestProject::new();
    let bin = evaluator::identity(project.root());
    project.init_file_project(
        &schema(),
        &format!(
            "[template]\npath = \"config.jsonnet\"\nbinary = \"{}\"\n",
            bin.display()
        ),
    );
    project.write_store(&[
        ("/acme/api/dev/database/host", "localhost"),
        ("/acme/api/dev/database/port", "5432"),
    ]);
    project.write_file("config.jsonnet", "std.extVar('secrets')\n");

    let result = workflow(&project, dev()).export().await.unwrap();
    assert_eq!(result.formatted, "DATABASE_HOST=localhost\nDATABASE_PORT=5432\n");
}

#[tokio::test]
async fn template_output_is_validated() {
    let project = TestProject::new();
    let bin = evaluator::fixed_output(project.root(), r#"{"database": {"port": 1}}"#, "");
    let project_config = format!(
        "[template]\npath = \"config.jsonnet\"\nbinary = \"{}\"\n",
        bin.display()
    );
    project.init_file_project(&schema(), &project_config);
    project.write_file("config.jsonnet", "{}\n");

    let err = workflow(&project, dev()).export().await.unwrap_err();
    assert_eq!(err.code(), "CONSTRAINT_VIOLATION");
    assert!(err.to_string().contains("host"));
}

#[tokio::test]
async fn env_and_defaults_reach_the_evaluator() {
    let project = TestProject::new();
    let bin = evaluator::echo_inputs(project.root());
    let permissive = json!({"type": "object"});
    project.init_file_project(
        &permissive,
        &format!(
            "[template]\npath = \"config.jsonnet\"\nbinary = \"{}\"\n\n[template.defaults]\nregion = \"eu\"\n\n[output]\nformat = \"json\"\n",
            bin.display()
        ),
    );
    project.write_store(&[("/acme/api/dev/flag", "on")]);
    project.write_file("config.jsonnet", "{}\n");

    let result = workflow(&project, dev()).export().await.unwrap();
    assert_eq!(
        result.config,
        json!({"secrets": {"flag": "on"}, "env": "dev", "defaults": {"region": "eu"}})
    );
}

#[tokio::test]
async fn missing_template_file_is_system_error() {
    let project = seeded_project("[template]\npath = \"absent.jsonnet\"\n");
    let err = workflow(&project, dev()).export().await.unwrap_err();
    assert_eq!(err.code(), "FILE_NOT_FOUND");
}

#[tokio::test]
async fn no_template_override_skips_evaluation() {
    let project = seeded_project("[template]\npath = \"config.jsonnet\"\nbinary = \"strata-missing-bin\"\n");

    let err = workflow(&project, dev()).export().await.unwrap_err();
    assert_eq!(err.code(), "BINARY_NOT_FOUND");

    let result = workflow(
        &project,
        Overrides {
            no_template: true,
            ..dev()
        },
    )
    .export()
    .await
    .unwrap();
    assert_eq!(result.config["database"]["port"], json!(5432));
}

#[tokio::test]
async fn template_syntax_error_aborts_export() {
    let project = TestProject::new();
    let bin = evaluator::failing(
        project.root(),
        "STATIC ERROR: config.jsonnet:1:10: Expected token OPERATOR",
        1,
    );
    project.init_file_project(
        &schema(),
        &format!("[template]\npath = \"config.jsonnet\"\nbinary = \"{}\"\n", bin.display()),
    );
    project.write_file("config.jsonnet", "{ broken\n");

    let err = workflow(&project, dev()).export().await.unwrap_err();
    assert_eq!(err.code(), "TEMPLATE_SYNTAX_ERROR");
    assert_eq!(err.kind(), strata_core::ErrorKind::Template);
}
