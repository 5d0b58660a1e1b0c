//! Invocation of the external evaluator binary

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::process::Command;

use crate::{Result, TemplateError, classify_stderr};

pub const DEFAULT_BINARY: &str = "jsonnet";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Longest stdout excerpt quoted in [`TemplateError::InvalidOutput`]
const PREVIEW_CHARS: usize = 100;
const SECRETS_PREFIX: &str = "strata-secrets-";

/// Runs templates with a given binary and deadline.
#[derive(Debug, Clone)]
pub struct TemplateEvaluator {
    binary: String,
    timeout_ms: u64,
}

impl Default for TemplateEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl TemplateEvaluator {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Evaluate `template_path` with `secrets` bound to the `secrets`
    /// external variable and `env` to `env`.
    ///
    /// `defaults` is passed inline on the command line and must not contain
    /// sensitive values. The secrets temp file is removed before this returns,
    /// on every path.
    pub async fn evaluate(
        &self,
        secrets: &Value,
        env: &str,
        template_path: &Path,
        defaults: Option<&Value>,
    ) -> Result<Value> {
        if !template_path.is_file() {
            return Err(strata_fs::Error::FileNotFound {
                path: template_path.to_path_buf(),
            }
            .into());
        }

        tracing::debug!(
            binary = %self.binary,
            template = %template_path.display(),
            env = %env,
            timeout_ms = self.timeout_ms,
            "Evaluating template"
        );

        strata_fs::with_json_temp_file_async(secrets, SECRETS_PREFIX, |secrets_path| {
            self.run(secrets_path, env, template_path, defaults)
        })
        .await
    }

    async fn run(
        &self,
        secrets_path: PathBuf,
        env: &str,
        template_path: &Path,
        defaults: Option<&Value>,
    ) -> Result<Value> {
        let mut secrets_arg = OsString::from("secrets=");
        secrets_arg.push(&secrets_path);

        let mut cmd = Command::new(&self.binary);
        cmd.arg("--ext-code-file")
            .arg(secrets_arg)
            .arg("--ext-str")
            .arg(format!("env={env}"));
        if let Some(defaults) = defaults {
            cmd.arg("--ext-code").arg(format!("defaults={defaults}"));
        }
        cmd.arg(template_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => strata_fs::Error::BinaryNotFound {
                binary: self.binary.clone(),
            },
            _ => strata_fs::Error::io("spawn template evaluator", &self.binary, e),
        })?;

        // Dropping the wait future on timeout kills the child
        let deadline = Duration::from_millis(self.timeout_ms);
        let output = match tokio::time::timeout(deadline, child.wait_with_output()).await {
            Ok(waited) => waited
                .map_err(|e| strata_fs::Error::io("wait for template evaluator", &self.binary, e))?,
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout_ms, "Template evaluator killed after timeout");
                return Err(TemplateError::Timeout {
                    timeout_ms: self.timeout_ms,
                }
                .into());
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(classify_stderr(&stderr, output.status.code()).into());
        }
        if !stderr.trim().is_empty() {
            tracing::warn!(stderr = %stderr.trim(), "Template evaluator reported diagnostics");
        }

        parse_output(&output.stdout)
    }
}

/// Evaluate with the default binary and the given timeout.
pub async fn evaluate(
    secrets: &Value,
    env: &str,
    template_path: &Path,
    timeout_ms: u64,
) -> Result<Value> {
    TemplateEvaluator::default()
        .with_timeout_ms(timeout_ms)
        .evaluate(secrets, env, template_path, None)
        .await
}

fn parse_output(stdout: &[u8]) -> Result<Value> {
    let text = String::from_utf8_lossy(stdout);
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Ok(value),
        _ => Err(TemplateError::InvalidOutput {
            preview: preview(text.trim()),
        }
        .into()),
    }
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
