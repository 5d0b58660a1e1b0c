//! CLI end-to-end tests that invoke the compiled `strata` binary against
//! file-provider projects in temporary directories.

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use strata_test_utils::TestProject;

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
                "required": ["host", "port"]
            },
            "debug": {"type": "boolean"}
        }
    })
}

/// A project with `database.host` and `database.port` stored for `api/dev`.
fn seeded_project(extra_config: &str) -> TestProject {
    let project = TestProject::new();
    project.init_file_project(&schema(), extra_config);
    project.write_store(&[
        ("/acme/api/dev/database/host", "localhost"),
        ("/acme/api/dev/database/port", "5432"),
    ]);
    project
}

/// `strata` with colors off and no ambient environment or global config.
fn strata(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("strata").unwrap();
    cmd.current_dir(project.root())
        .env("NO_COLOR", "1")
        .env("XDG_CONFIG_HOME", project.path(".xdg"))
        .env_remove("STRATA_ENV")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn help_lists_subcommands() {
    let project = TestProject::new();
    strata(&project)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("schema"));
}

#[test]
fn export_prints_env_lines() {
    let project = seeded_project("");
    strata(&project)
        .args(["export", "--env", "dev"])
        .assert()
        .success()
        .stdout("DATABASE_HOST=localhost\nDATABASE_PORT=5432\n");
}

#[test]
fn env_variable_supplies_environment() {
    let project = seeded_project("");
    strata(&project)
        .env("STRATA_ENV", "dev")
        .args(["export", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"port\": 5432"));
}

#[test]
fn export_runs_from_nested_directory() {
    let project = seeded_project("");
    let nested = project.path("services/api");
    std::fs::create_dir_all(&nested).unwrap();

    strata(&project)
        .current_dir(&nested)
        .args(["export", "--env", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DATABASE_HOST=localhost"));
}

#[test]
fn export_to_file() {
    let project = seeded_project("");
    strata(&project)
        .args(["export", "--env", "dev", "--output", "out/.env"])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("Wrote"));

    project.assert_file_contains("out/.env", "DATABASE_PORT=5432");
}

#[test]
fn export_warns_about_unknown_keys() {
    let project = seeded_project("");
    project.write_store(&[
        ("/acme/api/dev/database/host", "localhost"),
        ("/acme/api/dev/database/port", "5432"),
        ("/acme/api/dev/feature/flag", "on"),
    ]);

    strata(&project)
        .args(["export", "--env", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FEATURE_FLAG=on"))
        .stderr(predicate::str::contains("warning"))
        .stderr(predicate::str::contains("feature.flag"));
}

#[test]
fn strict_export_fails_on_unknown_keys() {
    let project = seeded_project("");
    project.write_store(&[
        ("/acme/api/dev/database/host", "localhost"),
        ("/acme/api/dev/database/port", "5432"),
        ("/acme/api/dev/feature/flag", "on"),
    ]);

    strata(&project)
        .args(["export", "--env", "dev", "--strict"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("error[UNKNOWN_KEYS]"))
        .stderr(predicate::str::contains("api:feature.flag"));
}

#[test]
fn extra_source_overrides_primary_and_conflict_is_reported() {
    let project = seeded_project("");
    project.write_store(&[
        ("/acme/api/dev/database/host", "localhost"),
        ("/acme/api/dev/database/port", "5432"),
        ("/acme/shared/dev/database/host", "shared-db"),
    ]);

    let output = strata(&project)
        .args(["export", "--env", "dev", "--source", "shared", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(
        report["config"],
        json!({"database": {"host": "shared-db", "port": 5432}})
    );
    assert_eq!(report["conflicts"].as_array().unwrap().len(), 1);
    assert_eq!(report["conflicts"][0]["path"], "database.host");
    assert_eq!(report["conflicts"][0]["source_a"], "api");
    assert_eq!(report["conflicts"][0]["source_b"], "shared");
    assert_eq!(report["conflicts"][0]["kind"], "override");
}

#[test]
fn missing_required_key_fails_validation() {
    let project = TestProject::new();
    project.init_file_project(&schema(), "");
    project.write_store(&[("/acme/api/dev/database/host", "localhost")]);

    strata(&project)
        .args(["export", "--env", "dev"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[CONSTRAINT_VIOLATION]"));
}

#[test]
fn json_errors_use_envelope() {
    let project = seeded_project("");
    let output = strata(&project)
        .args(["export", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let body = stdout_json(&output);
    assert_eq!(body["error"]["code"], "CONFIG_MISSING");
    assert_eq!(body["error"]["kind"], "system");
}

#[test]
fn get_prints_typed_value() {
    let project = seeded_project("");
    strata(&project)
        .args(["get", "database.port", "--env", "dev"])
        .assert()
        .success()
        .stdout("5432\n");

    let output = strata(&project)
        .args(["get", "DATABASE.HOST", "--env", "dev", "--json"])
        .output()
        .unwrap();
    let got = stdout_json(&output);
    assert_eq!(got["path"], "database.host");
    assert_eq!(got["value"], "localhost");
    assert_eq!(got["type_tag"], "string");
}

#[test]
fn get_missing_key_is_provider_error() {
    let project = seeded_project("");
    strata(&project)
        .args(["get", "debug", "--env", "dev"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[PROVIDER_KEY_NOT_FOUND]"));
}

#[test]
fn get_rejects_path_outside_schema() {
    let project = seeded_project("");
    strata(&project)
        .args(["get", "database.user", "--env", "dev"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[SCHEMA_PATH_NOT_FOUND]"));
}

#[test]
fn set_stores_canonical_value() {
    let project = seeded_project("");
    strata(&project)
        .args(["set", "Debug", "true", "--env", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("debug = true"));

    let store = project.read_store();
    assert_eq!(store["entries"]["/acme/api/dev/debug"]["value"], "true");
}

#[test]
fn set_rejects_unparseable_value() {
    let project = seeded_project("");
    strata(&project)
        .args(["set", "database.port", "not-a-port", "--env", "dev"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[PARSE_FAILED]"));
}

#[test]
fn set_with_unknown_mode_is_usage_error() {
    let project = seeded_project("");
    strata(&project)
        .args(["set", "debug", "true", "--mode", "roman", "--env", "dev"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[INVALID_ARGUMENT]"));
}

#[test]
fn protected_environment_requires_flag() {
    let project = TestProject::new();
    project.init_file_project(&schema(), "[guards]\nprotected_envs = [\"prod\"]\n");

    strata(&project)
        .args(["set", "database.host", "db.internal", "--env", "prod"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[GUARD_VIOLATION]"));

    strata(&project)
        .args([
            "set",
            "database.host",
            "db.internal",
            "--env",
            "prod",
            "--allow-protected",
        ])
        .assert()
        .success();

    let store = project.read_store();
    assert_eq!(
        store["entries"]["/acme/api/prod/database/host"]["value"],
        "db.internal"
    );
}

#[test]
fn delete_removes_key() {
    let project = seeded_project("");
    strata(&project)
        .args(["delete", "database.host", "--env", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted database.host"));

    let store = project.read_store();
    assert!(store["entries"].get("/acme/api/dev/database/host").is_none());
    assert!(store["entries"].get("/acme/api/dev/database/port").is_some());
}

#[test]
fn list_shows_presence() {
    let project = seeded_project("");
    let output = strata(&project)
        .args(["list", "--env", "dev", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries = stdout_json(&output);
    let rows: Vec<(String, bool)> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["path"].as_str().unwrap().to_string(),
                e["present"].as_bool().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("database.host".to_string(), true),
            ("database.port".to_string(), true),
            ("debug".to_string(), false),
        ]
    );
}

#[test]
fn import_writes_document_leaves() {
    let project = TestProject::new();
    project.init_file_project(&schema(), "");
    project.write_file(
        "seed.yaml",
        "database:\n  host: db.local\n  port: 5433\ndebug: false\n",
    );

    strata(&project)
        .args(["import", "seed.yaml", "--env", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 keys"));

    strata(&project)
        .args(["export", "--env", "dev"])
        .assert()
        .success()
        .stdout("DATABASE_HOST=db.local\nDATABASE_PORT=5433\nDEBUG=false\n");
}

#[test]
fn strict_import_rejects_unknown_keys_before_writing() {
    let project = TestProject::new();
    project.init_file_project(&schema(), "");
    project.write_file("seed.json", r#"{"debug": true, "rogue": "x"}"#);

    strata(&project)
        .args(["import", "seed.json", "--env", "dev", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[UNKNOWN_KEYS]"));

    assert!(!project.path(".strata/store.json").exists());
}

#[test]
fn schema_hash_is_stable() {
    let project = seeded_project("");
    let first = strata(&project).args(["schema", "hash"]).output().unwrap();
    let second = strata(&project).args(["schema", "hash"]).output().unwrap();

    assert!(first.status.success());
    let hash = String::from_utf8(first.stdout).unwrap();
    assert!(hash.starts_with("sha256:"));
    assert_eq!(hash, String::from_utf8(second.stdout).unwrap());
}

#[test]
fn pinned_hash_mismatch_warns() {
    let project = seeded_project("");
    let config = std::fs::read_to_string(project.path(".strata/config.toml")).unwrap();
    let pin = format!("sha256:{}", "0".repeat(64));
    project.write_config(&config.replace(
        "path = \"schema.json\"",
        &format!("path = \"schema.json\"\nhash = \"{pin}\""),
    ));

    strata(&project)
        .args(["export", "--env", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DATABASE_HOST=localhost"))
        .stderr(predicate::str::contains("schema changed"));
}

#[test]
fn unknown_provider_lists_available() {
    let project = seeded_project("");
    strata(&project)
        .args(["export", "--env", "dev", "--provider", "vault"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[PROVIDER_NOT_FOUND]"))
        .stderr(predicate::str::contains("file"));
}
