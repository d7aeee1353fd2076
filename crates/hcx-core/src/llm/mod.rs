//! Generation clients for the external LLM APIs.
//!
//! The converter only needs "prompt in, text out", so both providers sit behind
//! [`GenerationClient`]. Handlers and tests hold an `Arc<dyn GenerationClient>` and never
//! see which backend answers.

mod openai;
mod vertex;

pub use openai::OpenAiClient;
pub use vertex::VertexClient;

use crate::config::{LlmConfig, LlmSettings};
use crate::error::{ConverterError, ConverterResult};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Sends `prompt` and returns the model's text reply.
    async fn generate(&self, prompt: &str) -> ConverterResult<String>;
}

/// Builds the client selected by `LLM_PROVIDER`.
pub fn client_from_config(config: &LlmConfig) -> ConverterResult<Arc<dyn GenerationClient>> {
    let http = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| ConverterError::Internal(format!("failed to build HTTP client: {e}")))?;

    let client: Arc<dyn GenerationClient> = match &config.settings {
        LlmSettings::OpenAi(settings) => Arc::new(OpenAiClient::new(
            http,
            settings.clone(),
            config.temperature,
        )),
        LlmSettings::Vertex(settings) => Arc::new(VertexClient::new(
            http,
            settings.clone(),
            config.temperature,
        )),
    };

    tracing::info!("LLM provider: {}", client.name());
    Ok(client)
}

/// Stands in when no provider is configured; every call fails with the reason.
///
/// Lets the runner serve the stubs and the validation endpoint without LLM credentials.
pub struct UnconfiguredClient {
    reason: String,
}

impl UnconfiguredClient {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl GenerationClient for UnconfiguredClient {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn generate(&self, _prompt: &str) -> ConverterResult<String> {
        Err(ConverterError::Generation(format!(
            "LLM provider is not configured: {}",
            self.reason
        )))
    }
}

/// Reads a provider response, turning non-2xx statuses into
/// [`ConverterError::GenerationStatus`].
async fn read_json(response: reqwest::Response) -> ConverterResult<serde_json::Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ConverterError::GenerationStatus {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}
