//! Outbound HCX calls.

use super::protocol::HcxEnvelope;
use crate::error::{HcxError, HcxResult};
use serde_json::Value;
use std::time::Duration;

/// HCX API operations the stubs call, by path relative to the partner base URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    EligibilityCheck,
    EligibilityOnCheck,
    ClaimSubmit,
    ClaimOnSubmit,
    PreauthSubmit,
    PreauthOnSubmit,
    CommunicationRequest,
    CommunicationOnRequest,
}

impl Operation {
    pub fn path(self) -> &'static str {
        match self {
            Operation::EligibilityCheck => "/coverageeligibility/check",
            Operation::EligibilityOnCheck => "/coverageeligibility/on_check",
            Operation::ClaimSubmit => "/claim/submit",
            Operation::ClaimOnSubmit => "/claim/on_submit",
            Operation::PreauthSubmit => "/preauth/submit",
            Operation::PreauthOnSubmit => "/preauth/on_submit",
            Operation::CommunicationRequest => "/communication/request",
            Operation::CommunicationOnRequest => "/communication/on_request",
        }
    }
}

/// Partner reply to a forwarded envelope.
#[derive(Clone, Debug, PartialEq)]
pub struct Forwarded {
    pub status: u16,
    pub body: Value,
}

/// Posts envelopes to one partner base URL (the HCX gateway or the other stub).
#[derive(Clone, Debug)]
pub struct HcxGateway {
    http: reqwest::Client,
    base_url: String,
}

impl HcxGateway {
    pub fn new(base_url: &str, timeout: Duration) -> HcxResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
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

    pub fn url_for(&self, operation: Operation) -> String {
        format!("{}{}", self.base_url, operation.path())
    }

    /// Posts `envelope`; non-2xx replies become [`HcxError::Upstream`].
    pub async fn send(&self, operation: Operation, envelope: &HcxEnvelope) -> HcxResult<Forwarded> {
        let url = self.url_for(operation);
        tracing::info!(
            "POST {url} (api_call_id {}, correlation_id {}, {} -> {})",
            envelope.headers.api_call_id,
            envelope.headers.correlation_id,
            envelope.headers.sender_code,
            envelope.headers.recipient_code
        );

        let response = self.http.post(&url).json(envelope).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!("{url} answered {status}");
            return Err(HcxError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(Forwarded {
            status: status.as_u16(),
            body,
        })
    }
}
