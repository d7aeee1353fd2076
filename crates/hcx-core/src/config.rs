//! Core runtime configuration.
//!
//! Configuration is resolved once at process start-up and then passed into the services.
//! Parsers take a key lookup closure instead of reading the process environment directly, so
//! binaries pass `|k| std::env::var(k).ok()` and tests pass a map.

use crate::constants::*;
use crate::error::{ConfigError, ConfigResult};
use std::fmt;
use std::time::Duration;

/// Looks up a configuration value by environment variable name.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// A credential that never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

fn optional(lookup: Lookup<'_>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(lookup: Lookup<'_>, key: &'static str) -> ConfigResult<String> {
    optional(lookup, key).ok_or(ConfigError::Missing(key))
}

fn parsed<T>(lookup: Lookup<'_>, key: &'static str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match optional(lookup, key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Which external generation API the converter calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Vertex,
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "vertex" | "vertexai" | "vertex-ai" => Ok(Self::Vertex),
            other => Err(format!("unknown LLM provider '{other}' (expected openai or vertex)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenAiSettings {
    pub api_key: Secret,
    pub model: String,
    pub base_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexSettings {
    pub project_id: String,
    pub location: String,
    pub model: String,
    pub access_token: Secret,
    /// Defaults to `https://{location}-aiplatform.googleapis.com`.
    pub endpoint: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LlmSettings {
    OpenAi(OpenAiSettings),
    Vertex(VertexSettings),
}

/// Generation client configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct LlmConfig {
    pub settings: LlmSettings,
    pub timeout: Duration,
    pub temperature: f32,
}

impl LlmConfig {
    /// Resolves the LLM configuration.
    ///
    /// `LLM_PROVIDER` selects the provider (default `openai`); each provider then has its own
    /// required variables.
    pub fn from_lookup(lookup: Lookup<'_>) -> ConfigResult<Self> {
        let provider = parsed(lookup, "LLM_PROVIDER", LlmProvider::OpenAi)?;

        let settings = match provider {
            LlmProvider::OpenAi => LlmSettings::OpenAi(OpenAiSettings {
                api_key: Secret::new(required(lookup, "OPENAI_API_KEY")?),
                model: optional(lookup, "OPENAI_MODEL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into()),
                base_url: trim_slash(
                    optional(lookup, "OPENAI_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into()),
                ),
            }),
            LlmProvider::Vertex => {
                let location = optional(lookup, "VERTEX_LOCATION")
                    .unwrap_or_else(|| DEFAULT_VERTEX_LOCATION.into());
                let endpoint = optional(lookup, "VERTEX_ENDPOINT")
                    .unwrap_or_else(|| format!("https://{location}-aiplatform.googleapis.com"));
                LlmSettings::Vertex(VertexSettings {
                    project_id: required(lookup, "VERTEX_PROJECT_ID")?,
                    access_token: Secret::new(required(lookup, "VERTEX_ACCESS_TOKEN")?),
                    model: optional(lookup, "VERTEX_MODEL")
                        .unwrap_or_else(|| DEFAULT_VERTEX_MODEL.into()),
                    location,
                    endpoint: trim_slash(endpoint),
                })
            }
        };

        Ok(Self {
            settings,
            timeout: Duration::from_secs(parsed(
                lookup,
                "LLM_TIMEOUT_SECS",
                DEFAULT_LLM_TIMEOUT_SECS,
            )?),
            temperature: parsed(lookup, "LLM_TEMPERATURE", DEFAULT_TEMPERATURE)?,
        })
    }

    pub fn provider(&self) -> LlmProvider {
        match self.settings {
            LlmSettings::OpenAi(_) => LlmProvider::OpenAi,
            LlmSettings::Vertex(_) => LlmProvider::Vertex,
        }
    }
}

/// Insurance-plan converter settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterConfig {
    pub sample_rows: usize,
    pub max_upload_bytes: usize,
    pub max_source_chars: usize,
    /// Appended to each InsurancePlan's `meta.profile` when set.
    pub profile_url: Option<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            sample_rows: DEFAULT_SAMPLE_ROWS,
            max_upload_bytes: hcx_files::DEFAULT_MAX_UPLOAD_BYTES,
            max_source_chars: DEFAULT_MAX_SOURCE_CHARS,
            profile_url: None,
        }
    }
}

impl ConverterConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> ConfigResult<Self> {
        let sample_rows = parsed(lookup, "EXCEL_SAMPLE_ROWS", DEFAULT_SAMPLE_ROWS)?;
        if sample_rows == 0 {
            return Err(ConfigError::Invalid {
                key: "EXCEL_SAMPLE_ROWS",
                message: "must be at least 1".into(),
            });
        }

        Ok(Self {
            sample_rows,
            max_upload_bytes: parsed(
                lookup,
                "MAX_UPLOAD_BYTES",
                hcx_files::DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            max_source_chars: parsed(lookup, "MAX_SOURCE_CHARS", DEFAULT_MAX_SOURCE_CHARS)?,
            profile_url: optional(lookup, "INSURANCE_PLAN_PROFILE_URL"),
        })
    }
}

/// HCX participant and partner settings shared by the payer and provider stubs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HcxConfig {
    pub provider_code: String,
    pub payer_code: String,
    /// Base URL the provider stub posts requests to (gateway or payer).
    pub provider_outbound_url: String,
    /// Base URL the payer stub posts responses to (gateway or provider).
    pub payer_outbound_url: String,
    pub fhir_utility_url: Option<String>,
    pub timeout: Duration,
}

impl Default for HcxConfig {
    fn default() -> Self {
        Self {
            provider_code: DEFAULT_PROVIDER_CODE.into(),
            payer_code: DEFAULT_PAYER_CODE.into(),
            provider_outbound_url: DEFAULT_PROVIDER_OUTBOUND_URL.into(),
            payer_outbound_url: DEFAULT_PAYER_OUTBOUND_URL.into(),
            fhir_utility_url: None,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl HcxConfig {
    /// Resolves partner settings.
    ///
    /// `HCX_GATEWAY_URL`, when set, is used for both directions unless a direction-specific
    /// `HCX_PROVIDER_OUTBOUND_URL` / `HCX_PAYER_OUTBOUND_URL` overrides it.
    pub fn from_lookup(lookup: Lookup<'_>) -> ConfigResult<Self> {
        let gateway = optional(lookup, "HCX_GATEWAY_URL");
        let outbound = |key: &str, default: &str| {
            trim_slash(
                optional(lookup, key)
                    .or_else(|| gateway.clone())
                    .unwrap_or_else(|| default.into()),
            )
        };

        Ok(Self {
            provider_code: optional(lookup, "HCX_PROVIDER_CODE")
                .unwrap_or_else(|| DEFAULT_PROVIDER_CODE.into()),
            payer_code: optional(lookup, "HCX_PAYER_CODE")
                .unwrap_or_else(|| DEFAULT_PAYER_CODE.into()),
            provider_outbound_url: outbound(
                "HCX_PROVIDER_OUTBOUND_URL",
                DEFAULT_PROVIDER_OUTBOUND_URL,
            ),
            payer_outbound_url: outbound("HCX_PAYER_OUTBOUND_URL", DEFAULT_PAYER_OUTBOUND_URL),
            fhir_utility_url: optional(lookup, "FHIR_UTILITY_URL").map(trim_slash),
            timeout: Duration::from_secs(parsed(
                lookup,
                "HCX_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        })
    }
}

/// Everything the services need apart from the LLM, which only the converter requires.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoreConfig {
    pub converter: ConverterConfig,
    pub hcx: HcxConfig,
}

impl CoreConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> ConfigResult<Self> {
        Ok(Self {
            converter: ConverterConfig::from_lookup(lookup)?,
            hcx: HcxConfig::from_lookup(lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn openai_is_default_provider_and_requires_key() {
        let lookup = lookup_from(&[]);
        let err = LlmConfig::from_lookup(&lookup).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("OPENAI_API_KEY")));

        let lookup = lookup_from(&[("OPENAI_API_KEY", "sk-test")]);
        let config = LlmConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.provider(), LlmProvider::OpenAi);
        match config.settings {
            LlmSettings::OpenAi(s) => {
                assert_eq!(s.model, DEFAULT_OPENAI_MODEL);
                assert_eq!(s.base_url, DEFAULT_OPENAI_BASE_URL);
                assert_eq!(s.api_key.expose(), "sk-test");
            }
            other => panic!("expected OpenAI settings, got {other:?}"),
        }
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS));
    }

    #[test]
    fn vertex_requires_its_own_variables() {
        let lookup = lookup_from(&[("LLM_PROVIDER", "vertex"), ("OPENAI_API_KEY", "sk")]);
        let err = LlmConfig::from_lookup(&lookup).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("VERTEX_PROJECT_ID")));

        let lookup = lookup_from(&[
            ("LLM_PROVIDER", "Vertex"),
            ("VERTEX_PROJECT_ID", "hcx-dev"),
            ("VERTEX_ACCESS_TOKEN", "ya29.token"),
            ("VERTEX_LOCATION", "us-central1"),
        ]);
        let config = LlmConfig::from_lookup(&lookup).unwrap();
        match config.settings {
            LlmSettings::Vertex(s) => {
                assert_eq!(s.project_id, "hcx-dev");
                assert_eq!(s.endpoint, "https://us-central1-aiplatform.googleapis.com");
                assert_eq!(s.model, DEFAULT_VERTEX_MODEL);
            }
            other => panic!("expected Vertex settings, got {other:?}"),
        }
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let lookup = lookup_from(&[("LLM_PROVIDER", "llama")]);
        let err = LlmConfig::from_lookup(&lookup).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LLM_PROVIDER", .. }));
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let lookup = lookup_from(&[("OPENAI_API_KEY", "sk-very-secret")]);
        let config = LlmConfig::from_lookup(&lookup).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("Secret(***)"));
    }

    #[test]
    fn converter_defaults_and_overrides() {
        let defaults = ConverterConfig::from_lookup(&lookup_from(&[])).unwrap();
        assert_eq!(defaults, ConverterConfig::default());

        let lookup = lookup_from(&[
            ("EXCEL_SAMPLE_ROWS", "3"),
            ("MAX_UPLOAD_BYTES", "2048"),
            (
                "INSURANCE_PLAN_PROFILE_URL",
                "https://ig.hcxprotocol.io/v0.7.1/StructureDefinition-InsurancePlan.html",
            ),
        ]);
        let config = ConverterConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.sample_rows, 3);
        assert_eq!(config.max_upload_bytes, 2048);
        assert!(config.profile_url.is_some());
    }

    #[test]
    fn converter_rejects_bad_numbers() {
        let lookup = lookup_from(&[("MAX_UPLOAD_BYTES", "ten megabytes")]);
        assert!(matches!(
            ConverterConfig::from_lookup(&lookup),
            Err(ConfigError::Invalid { key: "MAX_UPLOAD_BYTES", .. })
        ));

        let lookup = lookup_from(&[("EXCEL_SAMPLE_ROWS", "0")]);
        assert!(ConverterConfig::from_lookup(&lookup).is_err());
    }

    #[test]
    fn gateway_url_applies_to_both_directions_unless_overridden() {
        let lookup = lookup_from(&[
            ("HCX_GATEWAY_URL", "https://staging-hcx.example.org/api/v0.7/"),
            ("HCX_PAYER_OUTBOUND_URL", "http://payer-side.local/hcx/v1"),
        ]);
        let config = HcxConfig::from_lookup(&lookup).unwrap();
        assert_eq!(
            config.provider_outbound_url,
            "https://staging-hcx.example.org/api/v0.7"
        );
        assert_eq!(config.payer_outbound_url, "http://payer-side.local/hcx/v1");
    }

    #[test]
    fn hcx_defaults_point_stubs_at_each_other() {
        let config = HcxConfig::from_lookup(&lookup_from(&[])).unwrap();
        assert_eq!(config, HcxConfig::default());
        assert_eq!(config.fhir_utility_url, None);
    }
}
