//! Proxy to the FHIR utility service.
//!
//! JSON bodies are posted to `{FHIR_UTILITY_URL}/{path}` and the service's status and body are
//! relayed unchanged, errors included.

use crate::config::HcxConfig;
use crate::error::{HcxError, HcxResult};
use crate::hcx::Forwarded;
use serde_json::{json, Value};

#[derive(Clone, Debug)]
pub struct FhirUtilityClient {
    http: reqwest::Client,
    base_url: String,
}

impl FhirUtilityClient {
    /// Client for the configured service, or `None` when `FHIR_UTILITY_URL` is unset.
    pub fn from_config(config: &HcxConfig) -> HcxResult<Option<Self>> {
        let Some(base_url) = &config.fhir_utility_url else {
            return Ok(None);
        };
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Some(Self::with_client(http, base_url)))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Target URL for a relative `path`.
    ///
    /// Empty paths and `.`/`..` segments are rejected so callers cannot climb out of the base
    /// URL.
    pub fn url_for(&self, path: &str) -> HcxResult<String> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Err(HcxError::InvalidRequest("FHIR utility path is empty".into()));
        }
        if path.split('/').any(|segment| matches!(segment, "" | "." | "..")) {
            return Err(HcxError::InvalidRequest(format!(
                "invalid FHIR utility path '{path}'"
            )));
        }
        Ok(format!("{}/{}", self.base_url, path))
    }

    pub async fn forward(&self, path: &str, body: &Value) -> HcxResult<Forwarded> {
        let url = self.url_for(path)?;
        tracing::info!("forwarding to FHIR utility: POST {url}");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text }))
        };

        if status >= 400 {
            tracing::warn!("FHIR utility answered {status} for {url}");
        }

        Ok(Forwarded { status, body })
    }
}
