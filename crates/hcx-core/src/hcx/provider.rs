use super::templates;
use super::{parties, submit, Forwarded, HcxAck, HcxEnvelope, HcxGateway, HcxHeaders, HcxStatus};
use super::{Operation, Outbound, Submission};
use crate::config::HcxConfig;
use crate::constants::DEFAULT_COMMUNICATION_REPLY;
use crate::error::{HcxError, HcxResult};
use api_shared::{ClaimForm, CommunicationReply, EligibilityForm};
use fhir::{ClaimResponse, ClaimUse, CoverageEligibilityResponse};
use std::sync::Arc;

/// Provider side: starts eligibility, claim and pre-authorisation workflows, receives the
/// payer's callbacks and answers its communication requests.
#[derive(Clone, Debug)]
pub struct ProviderStub {
    config: Arc<HcxConfig>,
    gateway: HcxGateway,
}

impl ProviderStub {
    pub fn new(config: Arc<HcxConfig>) -> HcxResult<Self> {
        let gateway = HcxGateway::new(&config.provider_outbound_url, config.timeout)?;
        Ok(Self::with_gateway(config, gateway))
    }

    pub fn with_gateway(config: Arc<HcxConfig>, gateway: HcxGateway) -> Self {
        Self { config, gateway }
    }

    pub fn participant_code(&self) -> &str {
        &self.config.provider_code
    }

    fn request_headers(&self) -> HcxHeaders {
        HcxHeaders::request(&self.config.provider_code, &self.config.payer_code)
    }

    pub async fn check_eligibility(&self, form: &EligibilityForm) -> HcxResult<Submission> {
        let bundle = templates::eligibility_request(form, &parties(&self.config))?;
        let outbound = Outbound {
            operation: Operation::EligibilityCheck,
            envelope: HcxEnvelope::new(self.request_headers(), &bundle)?,
        };
        submit(&self.gateway, outbound).await
    }

    pub async fn submit_claim(&self, form: &ClaimForm) -> HcxResult<Submission> {
        self.send_claim(form, ClaimUse::Claim, Operation::ClaimSubmit)
            .await
    }

    pub async fn submit_preauth(&self, form: &ClaimForm) -> HcxResult<Submission> {
        self.send_claim(form, ClaimUse::Preauthorization, Operation::PreauthSubmit)
            .await
    }

    async fn send_claim(
        &self,
        form: &ClaimForm,
        claim_use: ClaimUse,
        operation: Operation,
    ) -> HcxResult<Submission> {
        let bundle = templates::claim_request(form, claim_use, &parties(&self.config))?;
        let outbound = Outbound {
            operation,
            envelope: HcxEnvelope::new(self.request_headers(), &bundle)?,
        };
        submit(&self.gateway, outbound).await
    }

    /// Logs and acknowledges an `on_check` / `on_submit` callback.
    pub fn receive_callback(&self, envelope: &HcxEnvelope) -> HcxResult<HcxAck> {
        envelope.ensure_recipient(&self.config.provider_code)?;
        let bundle = envelope.bundle()?;

        if let Some(response) = bundle.find::<CoverageEligibilityResponse>()? {
            tracing::info!(
                "eligibility response for correlation {}: outcome {:?}, in force {:?}",
                envelope.headers.correlation_id,
                response.outcome,
                response.insurance.first().and_then(|i| i.inforce)
            );
        } else if let Some(response) = bundle.find::<ClaimResponse>()? {
            let approved = response
                .total
                .iter()
                .find(|t| t.category.first_code() == Some("benefit"))
                .map(|t| t.amount.value);
            tracing::info!(
                "{:?} response for correlation {}: outcome {:?}, approved {:?}, preauth ref {:?}",
                response.claim_use,
                envelope.headers.correlation_id,
                response.outcome,
                approved,
                response.pre_auth_ref
            );
        } else {
            tracing::info!(
                "callback for correlation {} with {} entries",
                envelope.headers.correlation_id,
                bundle.entry.len()
            );
        }

        Ok(HcxAck::for_headers(&envelope.headers))
    }

    /// Accepts a payer's communication request and prepares the canned answer.
    pub fn receive_communication_request(
        &self,
        envelope: &HcxEnvelope,
    ) -> HcxResult<(HcxAck, Outbound)> {
        envelope.ensure_recipient(&self.config.provider_code)?;
        let bundle = envelope.bundle()?;
        if let Some(asked) = bundle.find::<fhir::Communication>()? {
            tracing::info!(
                "payer {} asks (correlation {}): {}",
                envelope.headers.sender_code,
                envelope.headers.correlation_id,
                asked.text()
            );
        }

        let outbound = reply_outbound(envelope, &bundle, DEFAULT_COMMUNICATION_REPLY)?;
        Ok((HcxAck::for_headers(&envelope.headers), outbound))
    }

    /// Posts a provider-written answer to `request` on `communication/on_request`, keeping the
    /// request's correlation id.
    pub async fn respond_communication(
        &self,
        request: &HcxEnvelope,
        reply: &CommunicationReply,
    ) -> HcxResult<Submission> {
        request.ensure_recipient(&self.config.provider_code)?;
        let message = reply.message.trim();
        if message.is_empty() {
            return Err(HcxError::InvalidRequest("reply message is empty".into()));
        }
        let outbound = reply_outbound(request, &request.bundle()?, message)?;
        submit(&self.gateway, outbound).await
    }

    pub async fn dispatch(&self, outbound: &Outbound) -> HcxResult<Forwarded> {
        self.gateway.send(outbound.operation, &outbound.envelope).await
    }
}

fn reply_outbound(request: &HcxEnvelope, bundle: &fhir::Bundle, message: &str) -> HcxResult<Outbound> {
    let reply = templates::communication_reply(bundle, message)?;
    Ok(Outbound {
        operation: Operation::CommunicationOnRequest,
        envelope: HcxEnvelope::new(
            request.headers.response_to(HcxStatus::ResponseComplete),
            &reply,
        )?,
    })
}
