//! Project configuration
//!
//! Settings are read from TOML layers merged in order, later layers winning:
//!
//! 1. **Global** - `<config_dir>/strata/config.toml`
//! 2. **Project** - `.strata/config.toml`
//! 3. **Local overrides** - `.strata/config.local.toml` (git-ignored)
//!
//! Command-line [`Overrides`] are applied last.

mod manifest;
mod resolver;

pub use manifest::{
    CoreSection, Manifest, OutputSection, Overrides, SchemaSection, SourcesSection,
    TemplateSection,
};
pub use resolver::{CONFIG_DIR, ConfigResolver, ResolvedConfig};
