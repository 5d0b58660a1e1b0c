//! Format-agnostic document loading and saving
//!
//! Schemas and file-backed stores may be JSON, YAML or TOML; the format is
//! picked from the file extension.

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result, io};

/// Format-agnostic document store.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a file.
    ///
    /// Format is detected from file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = io::read_text(path)?;
        let extension = extension_of(path);

        match extension.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| parse_error(path, "TOML", e)),
            "json" => serde_json::from_str(&content).map_err(|e| parse_error(path, "JSON", e)),
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|e| parse_error(path, "YAML", e))
            }
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    /// Save a document to a file, atomically.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let extension = extension_of(path);

        let content = match extension.as_str() {
            "toml" => toml::to_string_pretty(value).map_err(|e| serialize_error(path, "TOML", e))?,
            "json" => {
                let mut out = serde_json::to_string_pretty(value)
                    .map_err(|e| serialize_error(path, "JSON", e))?;
                out.push('\n');
                out
            }
            "yaml" | "yml" => {
                serde_yaml::to_string(value).map_err(|e| serialize_error(path, "YAML", e))?
            }
            _ => return Err(Error::UnsupportedFormat { extension }),
        };

        io::write_atomic(path, content.as_bytes())
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn parse_error(path: &Path, format: &str, e: impl std::fmt::Display) -> Error {
    Error::ConfigParse {
        path: path.to_path_buf(),
        format: format.into(),
        message: e.to_string(),
    }
}

fn serialize_error(path: &Path, format: &str, e: impl std::fmt::Display) -> Error {
    Error::ConfigSerialize {
        path: path.to_path_buf(),
        format: format.into(),
        message: e.to_string(),
    }
}
