//! HCX protocol headers and the request envelope.
//!
//! The headers travel as JSON members next to the FHIR `payload`. Payloads are plain JSON
//! bundles; JWE encryption is not applied.

use crate::error::{HcxError, HcxResult};
use fhir::{Bundle, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HcxStatus {
    #[default]
    #[serde(rename = "request.initiated")]
    RequestInitiated,
    #[serde(rename = "request.queued")]
    RequestQueued,
    #[serde(rename = "response.complete")]
    ResponseComplete,
    #[serde(rename = "response.partial")]
    ResponsePartial,
    #[serde(rename = "response.error")]
    ResponseError,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HcxHeaders {
    #[serde(rename = "x-hcx-api_call_id")]
    pub api_call_id: String,
    #[serde(rename = "x-hcx-correlation_id")]
    pub correlation_id: String,
    #[serde(rename = "x-hcx-workflow_id", default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(rename = "x-hcx-timestamp")]
    pub timestamp: String,
    #[serde(rename = "x-hcx-sender_code")]
    pub sender_code: String,
    #[serde(rename = "x-hcx-recipient_code")]
    pub recipient_code: String,
    #[serde(rename = "x-hcx-status", default)]
    pub status: HcxStatus,
}

impl HcxHeaders {
    /// Headers opening a new exchange: fresh ids and an IST timestamp.
    pub fn request(sender_code: &str, recipient_code: &str) -> Self {
        Self {
            api_call_id: Uuid::new_v4().to_string(),
            correlation_id: Uuid::new_v4().to_string(),
            workflow_id: Some(Uuid::new_v4().to_string()),
            timestamp: hcx_types::ist_timestamp(),
            sender_code: sender_code.to_string(),
            recipient_code: recipient_code.to_string(),
            status: HcxStatus::RequestInitiated,
        }
    }

    /// Headers answering `self`: same correlation and workflow ids, parties swapped, fresh
    /// call id.
    pub fn response_to(&self, status: HcxStatus) -> Self {
        Self {
            api_call_id: Uuid::new_v4().to_string(),
            correlation_id: self.correlation_id.clone(),
            workflow_id: self.workflow_id.clone(),
            timestamp: hcx_types::ist_timestamp(),
            sender_code: self.recipient_code.clone(),
            recipient_code: self.sender_code.clone(),
            status,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HcxEnvelope {
    #[serde(flatten)]
    pub headers: HcxHeaders,
    pub payload: Value,
}

impl HcxEnvelope {
    pub fn new(headers: HcxHeaders, bundle: &Bundle) -> HcxResult<Self> {
        Ok(Self {
            headers,
            payload: bundle.to_value()?,
        })
    }

    /// The payload as a bundle.
    pub fn bundle(&self) -> HcxResult<Bundle> {
        Ok(Bundle::from_value(self.payload.clone())?)
    }

    /// Fails unless the envelope is addressed to `participant_code`.
    pub fn ensure_recipient(&self, participant_code: &str) -> HcxResult<()> {
        if self.headers.recipient_code == participant_code {
            Ok(())
        } else {
            Err(HcxError::InvalidRequest(format!(
                "envelope is addressed to '{}', not '{}'",
                self.headers.recipient_code, participant_code
            )))
        }
    }
}

/// Acknowledgement returned synchronously for every HCX call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HcxAck {
    #[serde(rename = "x-hcx-api_call_id")]
    pub api_call_id: String,
    #[serde(rename = "x-hcx-correlation_id")]
    pub correlation_id: String,
    pub timestamp: String,
}

impl HcxAck {
    pub fn for_headers(headers: &HcxHeaders) -> Self {
        Self {
            api_call_id: headers.api_call_id.clone(),
            correlation_id: headers.correlation_id.clone(),
            timestamp: hcx_types::ist_timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn headers_use_protocol_names() {
        let headers = HcxHeaders::request("provider-1", "payer-1");
        let value = serde_json::to_value(&headers).unwrap();

        assert_eq!(value["x-hcx-sender_code"], "provider-1");
        assert_eq!(value["x-hcx-recipient_code"], "payer-1");
        assert_eq!(value["x-hcx-status"], "request.initiated");
        assert!(value["x-hcx-timestamp"].as_str().unwrap().ends_with("+05:30"));
        assert_ne!(value["x-hcx-api_call_id"], value["x-hcx-correlation_id"]);
    }

    #[test]
    fn response_keeps_correlation_and_swaps_parties() {
        let request = HcxHeaders::request("provider-1", "payer-1");
        let response = request.response_to(HcxStatus::ResponseComplete);

        assert_eq!(response.correlation_id, request.correlation_id);
        assert_eq!(response.workflow_id, request.workflow_id);
        assert_eq!(response.sender_code, "payer-1");
        assert_eq!(response.recipient_code, "provider-1");
        assert_ne!(response.api_call_id, request.api_call_id);
        assert_eq!(response.status, HcxStatus::ResponseComplete);
    }

    #[test]
    fn envelope_flattens_headers_next_to_payload() {
        let headers = HcxHeaders::request("a", "b");
        let envelope = HcxEnvelope::new(headers, &Bundle::collection(Vec::new())).unwrap();
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["x-hcx-sender_code"], "a");
        assert_eq!(value["payload"]["resourceType"], "Bundle");

        let back: HcxEnvelope = serde_json::from_value(value).unwrap();
        assert_eq!(back, envelope);
        assert!(back.bundle().unwrap().entry.is_empty());
    }

    #[test]
    fn envelope_without_workflow_or_status_is_accepted() {
        let envelope: HcxEnvelope = serde_json::from_value(json!({
            "x-hcx-api_call_id": "1",
            "x-hcx-correlation_id": "2",
            "x-hcx-timestamp": "2024-04-01T02:15:00.000+05:30",
            "x-hcx-sender_code": "p",
            "x-hcx-recipient_code": "q",
            "payload": {}
        }))
        .unwrap();
        assert_eq!(envelope.headers.workflow_id, None);
        assert_eq!(envelope.headers.status, HcxStatus::RequestInitiated);
    }

    #[test]
    fn recipient_mismatch_is_rejected() {
        let envelope = HcxEnvelope::new(
            HcxHeaders::request("provider-1", "payer-1"),
            &Bundle::collection(Vec::new()),
        )
        .unwrap();
        assert!(envelope.ensure_recipient("payer-1").is_ok());
        assert!(matches!(
            envelope.ensure_recipient("payer-2"),
            Err(HcxError::InvalidRequest(_))
        ));
    }
}
