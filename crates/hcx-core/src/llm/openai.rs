use super::{read_json, GenerationClient};
use crate::config::OpenAiSettings;
use crate::error::{ConverterError, ConverterResult};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Chat Completions client (`POST {base_url}/chat/completions`).
pub struct OpenAiClient {
    http: reqwest::Client,
    settings: OpenAiSettings,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, settings: OpenAiSettings, temperature: f32) -> Self {
        Self {
            http,
            settings,
            temperature,
        }
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.settings.model,
            "temperature": self.temperature,
            "messages": [
                {
                    "role": "system",
                    "content": "You convert insurance plan documents into FHIR R4 JSON. Reply with JSON only."
                },
                { "role": "user", "content": prompt }
            ]
        })
    }
}

fn reply_text(body: &Value) -> Option<&str> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> ConverterResult<String> {
        let url = format!("{}/chat/completions", self.settings.base_url);
        tracing::debug!("POST {url} (model {})", self.settings.model);

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.settings.api_key.expose())
            .json(&self.request_body(prompt))
            .send()
            .await?;
        let body = read_json(response).await?;

        reply_text(&body)
            .map(str::to_owned)
            .ok_or(ConverterError::EmptyGeneration)
    }
}
