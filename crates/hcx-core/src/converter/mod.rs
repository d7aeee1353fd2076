//! Insurance-plan converter.
//!
//! Turns an uploaded PDF or workbook into a FHIR `collection` bundle of `InsurancePlan`
//! resources:
//!
//! 1. accept and classify the upload ([`hcx_files::SourceDocument`])
//! 2. extract text ([`extract`])
//! 3. embed it in the prompt ([`prompt`]) and call the configured [`GenerationClient`]
//! 4. locate the JSON in the reply ([`reply`])
//! 5. normalise it into a bundle and check each entry ([`bundle`])
//!
//! Validation failures do not abort a conversion; they come back in [`Conversion::errors`]
//! next to the bundle so the caller decides what to do with them.

pub mod bundle;
pub mod extract;
pub mod prompt;
pub mod reply;

use crate::config::ConverterConfig;
use crate::error::ConverterResult;
use crate::llm::GenerationClient;
use fhir::{Bundle, InsurancePlan, Resource};
use hcx_files::{DocumentKind, DocumentMetadata, SourceDocument};
use serde_json::Value;
use std::sync::Arc;

/// Result of converting one document.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub bundle: Bundle,
    /// Entries that failed the shape check.
    pub errors: Vec<String>,
    /// Error objects the model returned in place of plans it could not convert.
    pub dropped: Vec<String>,
    pub source: DocumentMetadata,
}

impl Conversion {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A normalised bundle together with its shape-check results.
#[derive(Debug, Clone)]
pub struct CheckedBundle {
    pub bundle: Bundle,
    pub errors: Vec<String>,
    pub dropped: Vec<String>,
}

impl CheckedBundle {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Clone)]
pub struct InsurancePlanConverter {
    config: Arc<ConverterConfig>,
    llm: Arc<dyn GenerationClient>,
}

impl InsurancePlanConverter {
    pub fn new(config: Arc<ConverterConfig>, llm: Arc<dyn GenerationClient>) -> Self {
        Self { config, llm }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Accepts an upload, rejecting anything that is not a PDF or workbook.
    pub fn accept(
        &self,
        filename: &str,
        media_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> ConverterResult<SourceDocument> {
        Ok(SourceDocument::from_upload(
            filename,
            media_type,
            bytes,
            self.config.max_upload_bytes,
        )?)
    }

    /// Extracts the text the prompt would embed, without calling the model.
    pub async fn extract(&self, document: &SourceDocument) -> ConverterResult<String> {
        extract::extract_text(
            document,
            self.config.sample_rows,
            self.config.max_source_chars,
        )
        .await
    }

    pub async fn convert(&self, document: &SourceDocument) -> ConverterResult<Conversion> {
        let meta = document.metadata();
        tracing::info!(
            "converting {} ({}, {} bytes, sha256 {})",
            meta.original_filename,
            meta.kind,
            meta.size_bytes,
            meta.sha256
        );

        let text = self.extract(document).await?;
        let checked = self.convert_text(document.kind(), &text).await?;

        Ok(Conversion {
            bundle: checked.bundle,
            errors: checked.errors,
            dropped: checked.dropped,
            source: meta.clone(),
        })
    }

    /// Prompts the model with already extracted text and checks what comes back.
    pub async fn convert_text(
        &self,
        kind: DocumentKind,
        text: &str,
    ) -> ConverterResult<CheckedBundle> {
        let prompt = prompt::build_prompt(kind, text);
        tracing::debug!(
            "prompt built: {} chars of source text, sending to {}",
            text.chars().count(),
            self.llm.name()
        );

        let reply = self.llm.generate(&prompt).await?;
        let value = reply::extract_json(&reply)?;
        let normalised = bundle::normalise(value)?;

        for message in &normalised.dropped {
            tracing::warn!("model skipped a plan: {message}");
        }

        Ok(self.check(normalised))
    }

    /// Runs the normalise and validate steps on JSON supplied by the caller.
    pub fn validate_bundle(&self, value: Value) -> ConverterResult<CheckedBundle> {
        Ok(self.check(bundle::normalise(value)?))
    }

    fn check(&self, normalised: bundle::Normalised) -> CheckedBundle {
        let bundle::Normalised {
            bundle: mut plans,
            dropped,
        } = normalised;
        let errors = bundle::validate(&mut plans, self.config.profile_url.as_deref());
        log_summary(&plans, &errors);
        CheckedBundle {
            bundle: plans,
            errors,
            dropped,
        }
    }
}

fn log_summary(bundle: &Bundle, errors: &[String]) {
    for resource in bundle.resources() {
        if fhir::resource_type_of(resource) != Some(InsurancePlan::RESOURCE_TYPE) {
            continue;
        }
        match InsurancePlan::from_value(resource.clone()) {
            Ok(plan) => tracing::debug!(
                "plan '{}': {} coverage, {} plan elements",
                plan.name.as_deref().unwrap_or("<unnamed>"),
                plan.coverage_count(),
                plan.plan_count()
            ),
            Err(e) => tracing::debug!("plan entry does not match the InsurancePlan shape: {e}"),
        }
    }

    if errors.is_empty() {
        tracing::info!("bundle with {} entries passed validation", bundle.entry.len());
    } else {
        tracing::warn!(
            "bundle with {} entries has {} validation errors",
            bundle.entry.len(),
            errors.len()
        );
    }
}
