use super::{read_json, GenerationClient};
use crate::config::VertexSettings;
use crate::error::{ConverterError, ConverterResult};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Vertex AI Gemini client (`models/{model}:generateContent`).
///
/// Authenticates with a pre-issued OAuth access token; token refresh is left to whoever
/// sets `VERTEX_ACCESS_TOKEN`.
pub struct VertexClient {
    http: reqwest::Client,
    settings: VertexSettings,
    temperature: f32,
}

impl VertexClient {
    pub fn new(http: reqwest::Client, settings: VertexSettings, temperature: f32) -> Self {
        Self {
            http,
            settings,
            temperature,
        }
    }

    fn url(&self) -> String {
        let s = &self.settings;
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            s.endpoint, s.project_id, s.location, s.model
        )
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.temperature,
                "responseMimeType": "application/json"
            }
        })
    }
}

/// Concatenated text parts of the first candidate.
fn reply_text(body: &Value) -> Option<String> {
    let parts = body.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

#[async_trait]
impl GenerationClient for VertexClient {
    fn name(&self) -> &'static str {
        "vertex"
    }

    async fn generate(&self, prompt: &str) -> ConverterResult<String> {
        let url = self.url();
        tracing::debug!("POST {url}");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.settings.access_token.expose())
            .json(&self.request_body(prompt))
            .send()
            .await?;
        let body = read_json(response).await?;

        reply_text(&body).ok_or(ConverterError::EmptyGeneration)
    }
}
