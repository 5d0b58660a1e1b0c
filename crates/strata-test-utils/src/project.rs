//! [`TestProject`] builder for strata test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tempfile::TempDir;

/// A temporary project directory with helpers for writing configuration,
/// schemas and a file-provider store.
///
/// # Example
///
/// ```rust,no_run
/// use serde_json::json;
/// use strata_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.write_schema("schema.json", &json!({"type": "object"}));
/// project.write_config("[core]\nservice = \"api\"\n");
/// project.assert_file_exists(".strata/config.toml");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the project.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write `.strata/config.toml`.
    pub fn write_config(&self, toml: &str) -> PathBuf {
        self.write_file(".strata/config.toml", toml)
    }

    /// Write `.strata/config.local.toml`.
    pub fn write_local_config(&self, toml: &str) -> PathBuf {
        self.write_file(".strata/config.local.toml", toml)
    }

    /// Write a schema document as pretty JSON.
    pub fn write_schema(&self, relative: &str, schema: &Value) -> PathBuf {
        self.write_file(relative, &serde_json::to_string_pretty(schema).unwrap())
    }

    /// Write a minimal project using the file provider: schema at
    /// `schema.json`, store at `.strata/store.json`, prefix `/acme`, service
    /// `api`.
    pub fn init_file_project(&self, schema: &Value, extra_config: &str) {
        self.write_schema("schema.json", schema);
        self.write_config(&format!(
            "[core]\nprefix = \"/acme\"\nservice = \"api\"\nprovider = \"file\"\n\n\
             [schema]\npath = \"schema.json\"\n\n\
             [provider.file]\npath = \".strata/store.json\"\n\n{extra_config}"
        ));
    }

    /// Write `.strata/store.json` with plain (non-secure) entries keyed by
    /// full store path, e.g. `/acme/api/dev/database/host`.
    pub fn write_store(&self, entries: &[(&str, &str)]) -> PathBuf {
        let map: Map<String, Value> = entries
            .iter()
            .map(|(key, value)| (key.to_string(), json!({"value": value, "secure": false})))
            .collect();
        self.write_file(
            ".strata/store.json",
            &serde_json::to_string_pretty(&json!({ "entries": map })).unwrap(),
        )
    }

    /// Read `.strata/store.json` as JSON.
    pub fn read_store(&self) -> Value {
        let content = fs::read_to_string(self.path(".strata/store.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    /// Assert that `relative` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `relative` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, relative: &str, content: &str) {
        let full_path = self.path(relative);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}
