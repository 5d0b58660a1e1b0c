//! JSON file provider
//!
//! Stores every namespace in one document:
//!
//! ```json
//! {
//!   "entries": {
//!     "/acme/api/dev/database/host": { "value": "localhost", "secure": false }
//!   }
//! }
//! ```
//!
//! Writes go through [`strata_fs::ConfigStore::save`], which replaces the
//! file atomically.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strata_fs::ConfigStore;
use tokio::sync::Mutex;

use crate::{EncryptionType, Provider, ProviderContext, ProviderError, ProviderKv, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    entries: BTreeMap<String, StoredValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredValue {
    value: String,
    #[serde(default)]
    secure: bool,
}

/// Provider persisting to a local JSON document.
#[derive(Debug)]
pub struct FileProvider {
    path: PathBuf,
    secure_writes: bool,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            secure_writes: false,
            write_lock: Mutex::new(()),
        }
    }

    /// Mark values written by this provider as secure.
    pub fn with_secure_writes(mut self, secure: bool) -> Self {
        self.secure_writes = secure;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreDocument> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "Store file absent, treating as empty");
            return Ok(StoreDocument::default());
        }
        Ok(ConfigStore::new().load(&self.path)?)
    }

    fn save(&self, document: &StoreDocument) -> Result<()> {
        Ok(ConfigStore::new().save(&self.path, document)?)
    }
}

#[async_trait]
impl Provider for FileProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, ctx: &ProviderContext) -> Result<ProviderKv> {
        let document = self.load()?;
        let kv: ProviderKv = document
            .entries
            .into_iter()
            .filter_map(|(full, stored)| Some((ctx.relative_dot_path(&full)?, stored.value)))
            .collect();
        tracing::debug!(namespace = %ctx, keys = kv.len(), "Fetched from file store");
        Ok(kv)
    }

    async fn upsert(&self, ctx: &ProviderContext, path: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load()?;
        document.entries.insert(
            ctx.full_path(path),
            StoredValue {
                value: value.to_string(),
                secure: self.secure_writes,
            },
        );
        self.save(&document)
    }

    async fn delete(&self, ctx: &ProviderContext, path: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load()?;
        let full = ctx.full_path(path);
        if document.entries.remove(&full).is_none() {
            return Err(ProviderError::NotFound { path: full });
        }
        self.save(&document)
    }

    async fn verify_encryption(&self, ctx: &ProviderContext, path: &str) -> Result<EncryptionType> {
        let full = ctx.full_path(path);
        match self.load()?.entries.get(&full) {
            Some(stored) if stored.secure => Ok(EncryptionType::SecureString),
            Some(_) => Ok(EncryptionType::String),
            None => Err(ProviderError::NotFound { path: full }),
        }
    }
}
