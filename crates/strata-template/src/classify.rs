//! Classification of evaluator stderr
//!
//! Best effort: the evaluator reports failures as unstructured text, so the
//! resulting kind follows a few known phrasings and falls back to
//! [`TemplateError::Runtime`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::TemplateError;

/// `file:line:col`, optionally followed by a column range, or the
/// `file:(line:col)-(line:col)` multi-line form
static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<file>[^\s:()]+):\(?(?P<line>\d+):(?P<col>\d+)").unwrap()
});

const MISSING_VARIABLE: &[&str] = &["Undefined external variable", "Unknown variable"];
const SYNTAX: &[&str] = &["STATIC ERROR", "syntax error", "Expected"];
const ERROR_PREFIXES: &[&str] = &["RUNTIME ERROR: ", "STATIC ERROR: "];

/// Source position reported by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Extract the first `file:line:col` position in `text`.
pub fn extract_location(text: &str) -> Option<Location> {
    let caps = LOCATION.captures(text)?;
    Some(Location {
        file: caps["file"].to_string(),
        line: caps["line"].parse().ok()?,
        column: caps["col"].parse().ok()?,
    })
}

/// Classify a failed evaluation by its stderr.
///
/// `status` is the exit code, used only when stderr is empty.
pub fn classify_stderr(stderr: &str, status: Option<i32>) -> TemplateError {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        return TemplateError::ProcessFailed { status };
    }

    let location = extract_location(stderr);
    let message = headline(stderr);

    if MISSING_VARIABLE.iter().any(|p| stderr.contains(p)) {
        TemplateError::MissingVariable { message, location }
    } else if SYNTAX.iter().any(|p| stderr.contains(p)) {
        TemplateError::Syntax { message, location }
    } else {
        TemplateError::Runtime { message, location }
    }
}

/// First non-empty line without the evaluator's severity prefix.
fn headline(stderr: &str) -> String {
    let line = stderr
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    ERROR_PREFIXES
        .iter()
        .find_map(|prefix| line.strip_prefix(prefix))
        .unwrap_or(line)
        .to_string()
}
