//! Fake template evaluator binaries.
//!
//! Each helper writes an executable `/bin/sh` script into `dir` that accepts
//! the evaluator command line (`--ext-code-file secrets=<file>`,
//! `--ext-str env=<env>`, `--ext-code defaults=<json>`, template path) and
//! behaves in one scripted way. Unix only in practice.

use std::fs;
use std::path::{Path, PathBuf};

/// Argument loop shared by the scripts; sets `$secrets`, `$env`, `$defaults`
/// and `$template`.
const ARG_LOOP: &str = r#"secrets=""; env=""; defaults=""; template=""
while [ $# -gt 0 ]; do
  case "$1" in
    --ext-code-file) secrets="${2#secrets=}"; shift 2 ;;
    --ext-str) env="${2#env=}"; shift 2 ;;
    --ext-code) defaults="${2#defaults=}"; shift 2 ;;
    *) template="$1"; shift ;;
  esac
done
"#;

/// Write an executable script named `name` with the given body.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}

/// Prints the secrets file unchanged.
pub fn identity(dir: &Path) -> PathBuf {
    write_script(dir, "identity-eval", &format!("{ARG_LOOP}cat \"$secrets\""))
}

/// Prints `{"secrets": <file>, "env": "<env>", "defaults": <json or null>}`.
pub fn echo_inputs(dir: &Path) -> PathBuf {
    let body = format!(
        "{ARG_LOOP}[ -n \"$defaults\" ] || defaults=null\n\
         printf '{{\"secrets\": '\ncat \"$secrets\"\n\
         printf ', \"env\": \"%s\", \"defaults\": %s}}\\n' \"$env\" \"$defaults\""
    );
    write_script(dir, "echo-eval", &body)
}

/// Records every argument, one per line, into `record`, then prints `{}`.
pub fn recording(dir: &Path, record: &Path) -> PathBuf {
    let body = format!(
        "printf '%s\\n' \"$@\" > '{}'\necho '{{}}'",
        record.display()
    );
    write_script(dir, "recording-eval", &body)
}

/// Prints `stdout` verbatim and exits 0, writing `stderr` if non-empty.
pub fn fixed_output(dir: &Path, stdout: &str, stderr: &str) -> PathBuf {
    let mut body = format!("cat <<'STRATA_OUT'\n{stdout}\nSTRATA_OUT\n");
    if !stderr.is_empty() {
        body.push_str(&format!("cat >&2 <<'STRATA_ERR'\n{stderr}\nSTRATA_ERR\n"));
    }
    write_script(dir, "fixed-eval", &body)
}

/// Writes `stderr` and exits with `code`.
pub fn failing(dir: &Path, stderr: &str, code: i32) -> PathBuf {
    let body = format!("cat >&2 <<'STRATA_ERR'\n{stderr}\nSTRATA_ERR\nexit {code}");
    write_script(dir, "failing-eval", &body)
}

/// Sleeps for `seconds` before printing `{}`.
pub fn sleeping(dir: &Path, seconds: u32) -> PathBuf {
    write_script(dir, "sleeping-eval", &format!("sleep {seconds}\necho '{{}}'"))
}

/// Prints the secrets document as the value of a top-level `rendered` key
/// and copies `env` into `environment`, a minimal stand-in for a real
/// template that restructures its input.
pub fn wrapping(dir: &Path) -> PathBuf {
    let body = format!(
        "{ARG_LOOP}printf '{{\"environment\": \"%s\", \"rendered\": ' \"$env\"\n\
         cat \"$secrets\"\nprintf '}}\\n'"
    );
    write_script(dir, "wrapping-eval", &body)
}
