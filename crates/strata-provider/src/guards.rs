//! Write guards for protected environments

use serde::{Deserialize, Serialize};

use crate::{ProviderContext, ProviderError, Result};

/// Environments that refuse writes unless explicitly overridden.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default)]
    pub protected_envs: Vec<String>,
    /// Set from `--allow-protected`; never read from files
    #[serde(skip)]
    pub allow_protected: bool,
}

impl GuardConfig {
    pub fn protecting<I, S>(envs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected_envs: envs.into_iter().map(Into::into).collect(),
            allow_protected: false,
        }
    }

    pub fn allow_protected(mut self, allow: bool) -> Self {
        self.allow_protected = allow;
        self
    }

    pub fn is_protected(&self, env: &str) -> bool {
        self.protected_envs.iter().any(|p| p == env)
    }

    /// Fail when `ctx` targets a protected environment without override.
    pub fn check(&self, ctx: &ProviderContext) -> Result<()> {
        if self.is_protected(&ctx.env) && !self.allow_protected {
            return Err(ProviderError::GuardViolation {
                env: ctx.env.clone(),
            });
        }
        Ok(())
    }
}
