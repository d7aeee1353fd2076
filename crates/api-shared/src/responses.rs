//! JSON response bodies.
//!
//! FHIR content is carried as untyped JSON (`Object` in the schema); its shape is the FHIR R4
//! resource it names.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub service: String,
    pub message: String,
}

/// Error body returned by every endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// The bundle that failed validation, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub bundle: Option<Value>,
}

impl ErrorRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: Vec::new(),
            bundle: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_bundle(mut self, bundle: Value) -> Self {
        self.bundle = Some(bundle);
        self
    }
}

/// Successful conversion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRes {
    pub message: String,
    /// FHIR `Bundle` of type `collection`.
    #[schema(value_type = Object)]
    pub bundle: Value,
    /// Plans the model reported it could not convert.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    /// Metadata of the uploaded document.
    #[schema(value_type = Object)]
    pub source: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidateRes {
    pub valid: bool,
    #[schema(value_type = Object)]
    pub bundle: Value,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Synchronous acknowledgement of an HCX call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AckRes {
    #[serde(rename = "x-hcx-api_call_id")]
    pub api_call_id: String,
    #[serde(rename = "x-hcx-correlation_id")]
    pub correlation_id: String,
    pub timestamp: String,
}

/// Result of forwarding a request to an HCX partner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForwardRes {
    pub api_call_id: String,
    pub correlation_id: String,
    /// URL the envelope was posted to.
    pub forwarded_to: String,
    /// HTTP status the partner answered with.
    pub partner_status: u16,
    #[schema(value_type = Object)]
    pub partner_response: Value,
    /// FHIR `Bundle` that was sent.
    #[schema(value_type = Object)]
    pub payload: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimestampRes {
    #[schema(example = "2024-04-01T02:15:00.000+05:30")]
    pub timestamp: String,
}
