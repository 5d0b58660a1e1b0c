//! Provider trait and related types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{GuardConfig, ProviderContext, ProviderKv, Result};

/// How a provider stores a value at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptionType {
    SecureString,
    String,
    Unknown,
}

impl EncryptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecureString => "SecureString",
            Self::String => "String",
            Self::Unknown => "Unknown",
        }
    }
}

/// Core trait for key-value stores.
///
/// Paths passed to and returned from a provider are canonical dot paths;
/// each provider maps them to its own store layout.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Every value in the namespace.
    async fn fetch(&self, ctx: &ProviderContext) -> Result<ProviderKv>;

    async fn upsert(&self, ctx: &ProviderContext, path: &str, value: &str) -> Result<()>;

    /// Fails with [`crate::ProviderError::NotFound`] when absent.
    async fn delete(&self, ctx: &ProviderContext, path: &str) -> Result<()>;

    async fn verify_encryption(&self, _ctx: &ProviderContext, _path: &str) -> Result<EncryptionType> {
        Ok(EncryptionType::Unknown)
    }

    async fn check_guards(&self, ctx: &ProviderContext, guards: &GuardConfig) -> Result<()> {
        guards.check(ctx)
    }
}
