//! Configuration resolution with hierarchical merge

use std::path::{Path, PathBuf};

use strata_provider::{GuardConfig, ProviderContext, ProviderSettings};

use super::manifest::{Manifest, Overrides};
use crate::{Error, Result};

/// Project directory holding configuration and the default file store
pub const CONFIG_DIR: &str = ".strata";

/// Effective configuration for one project.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Project root; relative paths in the manifest resolve against it
    pub root: PathBuf,
    pub manifest: Manifest,
}

impl ResolvedConfig {
    pub fn new(root: impl Into<PathBuf>, manifest: Manifest) -> Self {
        Self {
            root: root.into(),
            manifest,
        }
    }

    /// `path` made absolute against the project root.
    pub fn project_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn schema_path(&self) -> Result<PathBuf> {
        self.manifest
            .schema
            .path
            .as_deref()
            .map(|p| self.project_path(p))
            .ok_or_else(|| Error::ConfigMissing {
                key: "schema.path".into(),
                flag: "a [schema] path".into(),
            })
    }

    pub fn template_path(&self) -> Option<PathBuf> {
        self.manifest
            .template
            .path
            .as_deref()
            .map(|p| self.project_path(p))
    }

    pub fn env(&self) -> Result<&str> {
        self.manifest
            .core
            .env
            .as_deref()
            .ok_or_else(|| Error::ConfigMissing {
                key: "core.env".into(),
                flag: "--env or STRATA_ENV".into(),
            })
    }

    pub fn service(&self) -> Result<&str> {
        self.manifest
            .core
            .service
            .as_deref()
            .ok_or_else(|| Error::ConfigMissing {
                key: "core.service".into(),
                flag: "--service".into(),
            })
    }

    /// Context of the primary service.
    pub fn context(&self) -> Result<ProviderContext> {
        Ok(ProviderContext::new(
            self.manifest.core.prefix.clone(),
            self.service()?,
            self.env()?,
        ))
    }

    /// Primary service first, then extra sources in declared order.
    pub fn source_names(&self) -> Result<Vec<String>> {
        let mut names = vec![self.service()?.to_string()];
        for extra in &self.manifest.sources.extra {
            if !names.contains(extra) {
                names.push(extra.clone());
            }
        }
        Ok(names)
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            root: self.root.clone(),
            options: self.manifest.provider_options(&self.manifest.core.provider),
        }
    }

    pub fn guards(&self) -> &GuardConfig {
        &self.manifest.guards
    }

    pub fn strict(&self) -> bool {
        self.manifest.core.strict
    }
}

/// Resolves configuration by merging multiple sources
///
/// Later layers override earlier ones; tables merge key by key, anything
/// else (arrays included) is replaced.
pub struct ConfigResolver {
    /// Project root directory
    root: PathBuf,

    /// Override for the global config directory (used for testing).
    /// When `None`, `dirs::config_dir()/strata` is used.
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create a resolver for the project at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            global_config_dir_override: None,
        }
    }

    /// Create a resolver with a custom global config directory.
    pub fn with_global_config_dir(root: impl Into<PathBuf>, global_config_dir: PathBuf) -> Self {
        Self {
            root: root.into(),
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("strata"))
    }

    fn layers(&self) -> Vec<(&'static str, PathBuf)> {
        let mut layers = Vec::with_capacity(3);
        if let Some(global_dir) = self.global_config_dir() {
            layers.push(("global", global_dir.join("config.toml")));
        }
        layers.push(("project", self.root.join(CONFIG_DIR).join("config.toml")));
        layers.push(("local", self.root.join(CONFIG_DIR).join("config.local.toml")));
        layers
    }

    /// Merge every present layer. Missing layers are skipped; invalid TOML
    /// in any layer is an error naming that file.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let mut merged = toml::Table::new();
        for (layer, path) in self.layers() {
            if !path.is_file() {
                tracing::debug!(layer, path = %path.display(), "Config layer absent, skipping");
                continue;
            }
            tracing::debug!(layer, path = %path.display(), "Loading config layer");
            let content = strata_fs::io::read_text(&path)?;
            let table: toml::Table = toml::from_str(&content).map_err(|e| Error::ConfigInvalid {
                path: path.clone(),
                message: e.to_string(),
            })?;
            deep_merge_table(&mut merged, table);
        }

        let manifest: Manifest =
            toml::Value::Table(merged)
                .try_into()
                .map_err(|e: toml::de::Error| Error::ConfigInvalid {
                    path: self.root.join(CONFIG_DIR),
                    message: e.to_string(),
                })?;
        Ok(ResolvedConfig::new(self.root.clone(), manifest))
    }

    /// [`Self::resolve`], then apply `overrides`.
    pub fn resolve_with(&self, overrides: &Overrides) -> Result<ResolvedConfig> {
        let mut config = self.resolve()?;
        config.manifest.apply(overrides);
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has_config(&self) -> bool {
        self.root.join(CONFIG_DIR).join("config.toml").is_file()
    }

    pub fn has_local_overrides(&self) -> bool {
        self.root.join(CONFIG_DIR).join("config.local.toml").is_file()
    }
}

/// Merge `overlay` into `base`, recursing into tables.
fn deep_merge_table(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                deep_merge_table(existing, incoming)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
