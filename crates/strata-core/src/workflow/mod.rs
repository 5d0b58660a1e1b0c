//! Workflow operations over one project
//!
//! A [`Workflow`] owns the resolved configuration and the provider registry
//! it was given. Every operation loads the schema and creates its provider
//! afresh, so nothing is shared between invocations.

mod export;
mod report;

use std::path::Path;

use serde_json::Value;
use strata_fs::ConfigStore;
use strata_provider::{Provider, ProviderError, ProviderRegistry};
use strata_schema::{SchemaAdapter, ValidationError, keypath};
use strata_template::TemplateEvaluator;

use crate::{Error, ResolvedConfig, Result};

pub use export::ExportStage;
pub use report::{ExportResult, GetResult, ImportReport, ListEntry, SetResult, Warning};

/// A loaded schema document with the adapter that reads it.
pub struct LoadedSchema {
    pub root: Value,
    pub adapter: Box<dyn SchemaAdapter>,
    pub hash: String,
}

impl LoadedSchema {
    /// Resolve `path` and return its canonical spelling and sub-schema.
    fn resolve(&self, path: &str) -> Result<(String, Value)> {
        let node = self.adapter.resolve_path(&self.root, path)?;
        Ok((node.canonical_path, node.schema))
    }
}

/// Entry point for every command.
pub struct Workflow {
    config: ResolvedConfig,
    registry: ProviderRegistry,
}

impl Workflow {
    pub fn new(config: ResolvedConfig, registry: ProviderRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Load the configured schema and check it is one the adapter reads.
    pub fn load_schema(&self) -> Result<LoadedSchema> {
        let path = self.config.schema_path()?;
        let root: Value = ConfigStore::new().load(&path)?;
        let adapter = self.config.manifest.schema.kind.adapter();
        adapter.ensure_schema(&root)?;
        let hash = adapter.compute_schema_hash(&root);
        tracing::debug!(path = %path.display(), kind = %adapter.kind(), hash = %hash, "Loaded schema");
        Ok(LoadedSchema {
            root,
            adapter,
            hash,
        })
    }

    fn provider(&self) -> Result<Box<dyn Provider>> {
        Ok(self.registry.create(
            &self.config.manifest.core.provider,
            &self.config.provider_settings(),
        )?)
    }

    fn evaluator(&self) -> TemplateEvaluator {
        let template = &self.config.manifest.template;
        TemplateEvaluator::new(template.binary.clone()).with_timeout_ms(template.timeout_ms)
    }

    /// `sha256:<hex>` of the configured schema.
    pub fn schema_hash(&self) -> Result<String> {
        Ok(self.load_schema()?.hash)
    }

    /// Read one key from the primary source as a typed value.
    pub async fn get(&self, path: &str) -> Result<GetResult> {
        let ctx = self.config.context()?;
        let schema = self.load_schema()?;
        let (canonical, sub_schema) = schema.resolve(path)?;

        let provider = self.provider()?;
        let kv = provider.fetch(&ctx).await?;
        let raw = kv.get(&canonical).or_else(|| kv.get(path)).ok_or_else(|| {
            ProviderError::NotFound {
                path: ctx.full_path(&canonical),
            }
        })?;

        let value = schema.adapter.parse_value(
            raw,
            &sub_schema,
            &canonical,
            self.config.manifest.core.parse_mode,
        )?;
        Ok(GetResult {
            type_tag: schema.adapter.describe_type(&sub_schema),
            path: canonical,
            value,
        })
    }

    /// Parse `raw` under the key's schema and store its canonical form.
    pub async fn set(&self, path: &str, raw: &str) -> Result<SetResult> {
        let ctx = self.config.context()?;
        let provider = self.provider()?;
        provider.check_guards(&ctx, self.config.guards()).await?;

        let schema = self.load_schema()?;
        let (canonical, sub_schema) = schema.resolve(path)?;
        let value = schema.adapter.parse_value(
            raw,
            &sub_schema,
            &canonical,
            self.config.manifest.core.parse_mode,
        )?;
        let stored = schema.adapter.serialize_value(&value, &sub_schema);

        provider.upsert(&ctx, &canonical, &stored).await?;
        tracing::info!(namespace = %ctx, path = %canonical, "Stored value");
        Ok(SetResult {
            path: canonical,
            value,
            stored,
        })
    }

    /// Remove one key. Keys outside the schema can be removed by their
    /// stored spelling.
    pub async fn delete(&self, path: &str) -> Result<String> {
        let ctx = self.config.context()?;
        let provider = self.provider()?;
        provider.check_guards(&ctx, self.config.guards()).await?;

        keypath::validate_path_segments(path)?;
        let schema = self.load_schema()?;
        let target = match schema.resolve(path) {
            Ok((canonical, _)) => canonical,
            Err(Error::Validation(ValidationError::PathNotFound { .. })) => path.to_string(),
            Err(e) => return Err(e),
        };

        provider.delete(&ctx, &target).await?;
        tracing::info!(namespace = %ctx, path = %target, "Deleted value");
        Ok(target)
    }

    /// Every schema leaf with its presence in the primary source, followed
    /// by stored keys the schema does not describe.
    pub async fn list(&self) -> Result<Vec<ListEntry>> {
        let ctx = self.config.context()?;
        let schema = self.load_schema()?;
        let provider = self.provider()?;
        let kv = provider.fetch(&ctx).await?;

        let leaves = schema.adapter.get_all_leaf_paths(&schema.root);
        let mut entries: Vec<ListEntry> = leaves
            .iter()
            .map(|leaf| ListEntry {
                present: kv.contains_key(&leaf.path),
                type_tag: schema.adapter.describe_type(&leaf.schema),
                path: leaf.path.clone(),
                in_schema: true,
            })
            .collect();

        for key in kv.keys() {
            if schema.adapter.resolve_path(&schema.root, key).is_err() {
                entries.push(ListEntry {
                    path: key.clone(),
                    type_tag: "unknown".into(),
                    present: true,
                    in_schema: false,
                });
            }
        }
        Ok(entries)
    }

    /// Write every leaf of a JSON, YAML or TOML document to the primary
    /// source. In strict mode unknown keys fail the import before anything
    /// is written.
    pub async fn import(&self, document: &Path) -> Result<ImportReport> {
        let ctx = self.config.context()?;
        let provider = self.provider()?;
        provider.check_guards(&ctx, self.config.guards()).await?;

        let tree: Value = ConfigStore::new().load(document)?;
        if !tree.is_object() {
            return Err(Error::ConfigInvalid {
                path: document.to_path_buf(),
                message: "import document must be a mapping at the top level".into(),
            });
        }

        let schema = self.load_schema()?;
        let raw = strata_schema::serialize_tree(&tree, &schema.root, schema.adapter.as_ref());

        let mut report = ImportReport::default();
        let mut writes = Vec::with_capacity(raw.len());
        let mut unknown = Vec::new();
        for (path, value) in raw {
            keypath::validate_path_segments(&path)?;
            match schema.resolve(&path) {
                Ok((canonical, _)) => writes.push((canonical, value)),
                Err(Error::Validation(ValidationError::PathNotFound { .. })) => {
                    unknown.push(format!("{}:{}", ctx.service, path));
                    report.warnings.push(Warning::UnknownKey {
                        service: ctx.service.clone(),
                        path: path.clone(),
                    });
                    writes.push((path, value));
                }
                Err(e) => return Err(e),
            }
        }

        if self.config.strict() && !unknown.is_empty() {
            return Err(ValidationError::UnknownKeys { keys: unknown }.into());
        }

        for (path, value) in writes {
            provider.upsert(&ctx, &path, &value).await?;
            report.written.push(path);
        }
        tracing::info!(namespace = %ctx, count = report.written.len(), "Imported values");
        Ok(report)
    }
}
