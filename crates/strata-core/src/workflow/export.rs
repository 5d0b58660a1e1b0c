//! The export pipeline
//!
//! `LoadSchema -> GetProvider -> FetchAllSources -> ParseEachSource ->
//! MergeSources -> EvaluateTemplate -> ValidateFinal -> FormatOutput`
//!
//! Stages run strictly in order and the first failure ends the export.
//! Sources are fetched concurrently but reach the merge in declared order.

use std::fmt;

use futures::future::try_join_all;
use serde_json::Value;
use strata_provider::ProviderContext;
use strata_schema::{ParsedKv, ValidationError, parse_provider_kv};

use super::{ExportResult, Warning, Workflow};
use crate::{Error, Result, merge_sources};

/// Pipeline stage, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    LoadSchema,
    GetProvider,
    FetchAllSources,
    ParseEachSource,
    MergeSources,
    EvaluateTemplate,
    ValidateFinal,
    FormatOutput,
    Done,
}

impl ExportStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadSchema => "load-schema",
            Self::GetProvider => "get-provider",
            Self::FetchAllSources => "fetch-all-sources",
            Self::ParseEachSource => "parse-each-source",
            Self::MergeSources => "merge-sources",
            Self::EvaluateTemplate => "evaluate-template",
            Self::ValidateFinal => "validate-final",
            Self::FormatOutput => "format-output",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enter(stage: ExportStage) {
    tracing::debug!(stage = %stage, "Export stage");
}

impl Workflow {
    /// Fetch, parse, merge, template, validate and render the configuration.
    pub async fn export(&self) -> Result<ExportResult> {
        let primary = self.config.context()?;
        let strict = self.config.strict();
        let mut warnings = Vec::new();

        enter(ExportStage::LoadSchema);
        let pinned = self.config.manifest.schema.hash.as_ref();
        if let Some(expected) = pinned.filter(|hash| !strata_fs::is_checksum(hash)) {
            return Err(Error::InvalidSetting {
                key: "schema.hash".into(),
                value: expected.clone(),
                expected: "sha256:<64 hex digits>".into(),
            });
        }
        let schema = self.load_schema()?;
        if let Some(expected) = pinned {
            if *expected != schema.hash {
                tracing::warn!(expected = %expected, actual = %schema.hash, "Schema drift");
                warnings.push(Warning::SchemaDrift {
                    expected: expected.clone(),
                    actual: schema.hash.clone(),
                });
            }
        }

        enter(ExportStage::GetProvider);
        let provider = self.provider()?;

        enter(ExportStage::FetchAllSources);
        let contexts: Vec<ProviderContext> = self
            .config
            .source_names()?
            .iter()
            .map(|name| primary.for_service(name.as_str()))
            .collect();
        let fetched = try_join_all(contexts.iter().map(|ctx| provider.fetch(ctx))).await?;

        enter(ExportStage::ParseEachSource);
        let mut unknown = Vec::new();
        let mut invalid = Vec::new();
        let mut parsed_sources: Vec<(String, Value)> = Vec::with_capacity(fetched.len());
        for (ctx, kv) in contexts.iter().zip(&fetched) {
            let ParsedKv {
                parsed,
                unknown_keys,
                invalid_values,
            } = parse_provider_kv(
                kv,
                &schema.root,
                schema.adapter.as_ref(),
                self.config.manifest.core.parse_mode,
            );
            tracing::debug!(
                service = %ctx.service,
                keys = kv.len(),
                unknown = unknown_keys.len(),
                "Parsed source"
            );

            for path in unknown_keys {
                unknown.push(format!("{}:{}", ctx.service, path));
                warnings.push(Warning::UnknownKey {
                    service: ctx.service.clone(),
                    path,
                });
            }
            for err in invalid_values {
                warnings.push(Warning::InvalidValue {
                    service: ctx.service.clone(),
                    path: err.path().unwrap_or_default().to_string(),
                    message: err.to_string(),
                });
                invalid.push(err);
            }
            parsed_sources.push((ctx.service.clone(), parsed));
        }

        if strict {
            if !unknown.is_empty() {
                return Err(ValidationError::UnknownKeys { keys: unknown }.into());
            }
            if let Some(err) = invalid.into_iter().next() {
                return Err(err.into());
            }
        }

        enter(ExportStage::MergeSources);
        let merge = merge_sources(&parsed_sources, strict)?;
        warnings.extend(merge.conflicts.iter().map(Warning::from_conflict));

        enter(ExportStage::EvaluateTemplate);
        let config = match self.config.template_path() {
            Some(template) => {
                self.evaluator()
                    .evaluate(
                        &merge.merged,
                        &primary.env,
                        &template,
                        self.config.manifest.template.defaults.as_ref(),
                    )
                    .await?
            }
            None => merge.merged,
        };

        enter(ExportStage::ValidateFinal);
        schema.adapter.validate(&schema.root, &config)?;

        enter(ExportStage::FormatOutput);
        let formatted = self.config.manifest.output.format.render(&config)?;

        enter(ExportStage::Done);
        tracing::info!(
            namespace = %primary,
            sources = parsed_sources.len(),
            conflicts = merge.conflicts.len(),
            warnings = warnings.len(),
            "Export complete"
        );

        Ok(ExportResult {
            config,
            formatted,
            conflicts: merge.conflicts,
            warnings,
            schema_hash: schema.hash,
        })
    }
}
