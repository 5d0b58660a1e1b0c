//! Provider registry
//!
//! Maps provider names to factories. The registry is an ordinary value
//! owned by the caller, so tests can register a provider that shares state
//! with the test body.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use crate::{FileProvider, MemoryProvider, Provider, ProviderError, Result};

/// Default location of the file provider's store, relative to the project
pub const DEFAULT_FILE_STORE: &str = ".strata/store.json";

/// Inputs handed to a factory.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    /// Project root; relative option paths resolve against it
    pub root: PathBuf,
    /// The `[provider.<name>]` table, values stringified
    pub options: BTreeMap<String, String>,
}

impl ProviderSettings {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

/// Builds a provider from settings.
pub type ProviderFactory = Arc<dyn Fn(&ProviderSettings) -> Result<Box<dyn Provider>> + Send + Sync>;

/// Registry mapping provider names to factories.
///
/// # Example
///
/// ```
/// use strata_provider::{Provider, ProviderRegistry, ProviderSettings};
///
/// let registry = ProviderRegistry::with_builtins();
/// assert_eq!(registry.list(), vec!["file", "memory"]);
/// let provider = registry.create("memory", &ProviderSettings::default()).unwrap();
/// assert_eq!(provider.name(), "memory");
/// ```
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.list())
            .finish()
    }
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in providers:
    /// - `memory`: a fresh, empty [`MemoryProvider`] per call
    /// - `file`: a [`FileProvider`] at option `path` (default
    ///   [`DEFAULT_FILE_STORE`]); option `secure = "true"` marks writes secure
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("memory", |_| Ok(Box::new(MemoryProvider::new())));
        registry.register("file", |settings| {
            let path = settings.option("path").unwrap_or(DEFAULT_FILE_STORE);
            let secure = match settings.option("secure") {
                None => false,
                Some(flag) => flag.parse::<bool>().map_err(|_| ProviderError::InvalidConfig {
                    provider: "file".into(),
                    message: format!("'secure' must be true or false, got '{flag}'"),
                })?,
            };
            Ok(Box::new(
                FileProvider::new(settings.root.join(path)).with_secure_writes(secure),
            ))
        });
        registry
    }

    /// Register a factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ProviderSettings) -> Result<Box<dyn Provider>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Build the provider registered as `name`.
    pub fn create(&self, name: &str, settings: &ProviderSettings) -> Result<Box<dyn Provider>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ProviderError::UnknownProvider {
                name: name.to_string(),
                available: self.list().into_iter().map(String::from).collect(),
            })?;
        tracing::debug!(provider = name, "Creating provider");
        factory(settings)
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
