//! In-process provider

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::{EncryptionType, Provider, ProviderContext, ProviderError, ProviderKv, Result};

/// Provider backed by a map keyed by full store path.
///
/// Clones share the same store, so a test can keep a handle while the
/// workflow owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    store: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `ctx` with `(dot path, value)` pairs.
    pub fn with_values<'a>(
        self,
        ctx: &ProviderContext,
        values: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        {
            let mut store = self.lock();
            for (path, value) in values {
                store.insert(ctx.full_path(path), value.to_string());
            }
        }
        self
    }

    /// Snapshot of every stored entry by full store path.
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Provider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, ctx: &ProviderContext) -> Result<ProviderKv> {
        Ok(self
            .lock()
            .iter()
            .filter_map(|(full, value)| Some((ctx.relative_dot_path(full)?, value.clone())))
            .collect())
    }

    async fn upsert(&self, ctx: &ProviderContext, path: &str, value: &str) -> Result<()> {
        self.lock().insert(ctx.full_path(path), value.to_string());
        Ok(())
    }

    async fn delete(&self, ctx: &ProviderContext, path: &str) -> Result<()> {
        let full = ctx.full_path(path);
        match self.lock().remove(&full) {
            Some(_) => Ok(()),
            None => Err(ProviderError::NotFound { path: full }),
        }
    }

    async fn verify_encryption(&self, _ctx: &ProviderContext, _path: &str) -> Result<EncryptionType> {
        Ok(EncryptionType::String)
    }
}
