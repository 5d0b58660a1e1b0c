//! Provider layer for strata
//!
//! A provider stores raw string values under a `(prefix, service, env)`
//! namespace. The rest of the workspace only sees the [`Provider`] trait;
//! concrete stores are created by name through a [`ProviderRegistry`] that
//! the caller owns and passes in.

pub mod context;
pub mod error;
pub mod file;
pub mod guards;
pub mod memory;
pub mod provider;
pub mod registry;

pub use context::{ProviderContext, ProviderKv};
pub use error::{ProviderError, Result};
pub use file::FileProvider;
pub use guards::GuardConfig;
pub use memory::MemoryProvider;
pub use provider::{EncryptionType, Provider};
pub use registry::{ProviderFactory, ProviderRegistry, ProviderSettings};
