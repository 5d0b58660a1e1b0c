//! Provider namespace

use std::collections::BTreeMap;
use std::fmt;

use strata_schema::keypath::{self, STORE_SEPARATOR};

/// Raw provider values keyed by canonical dot path.
pub type ProviderKv = BTreeMap<String, String>;

/// The `(prefix, service, env)` triple a provider operation is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderContext {
    pub prefix: String,
    pub service: String,
    pub env: String,
}

impl ProviderContext {
    pub fn new(
        prefix: impl Into<String>,
        service: impl Into<String>,
        env: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            service: service.into(),
            env: env.into(),
        }
    }

    /// Same prefix and env, different service. Used for extra sources.
    pub fn for_service(&self, service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..self.clone()
        }
    }

    /// Store path of the dot path `path` in this namespace.
    pub fn full_path(&self, path: &str) -> String {
        keypath::build_full_path(&self.prefix, &self.service, &self.env, path)
    }

    /// `{prefix}/{service}/{env}/`, the store prefix shared by every key.
    pub fn namespace(&self) -> String {
        self.full_path("")
    }

    /// Dot path of a full store path, if it belongs to this namespace.
    pub fn relative_dot_path(&self, full_path: &str) -> Option<String> {
        full_path
            .strip_prefix(&self.namespace())
            .filter(|rest| !rest.is_empty() && !rest.starts_with(STORE_SEPARATOR))
            .map(keypath::store_path_to_dot)
    }
}

impl fmt::Display for ProviderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.namespace().trim_end_matches(STORE_SEPARATOR))
    }
}
