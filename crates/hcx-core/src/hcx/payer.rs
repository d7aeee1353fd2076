use super::templates;
use super::{parties, submit, Forwarded, HcxAck, HcxEnvelope, HcxGateway, HcxHeaders, HcxStatus};
use super::{Operation, Outbound, Submission};
use crate::config::HcxConfig;
use crate::error::{HcxError, HcxResult};
use api_shared::CommunicationForm;
use fhir::{Claim, ClaimUse, Communication};
use std::sync::Arc;

/// Payer side: answers eligibility checks, claims and pre-authorisations, and asks providers
/// for more information.
#[derive(Clone, Debug)]
pub struct PayerStub {
    config: Arc<HcxConfig>,
    gateway: HcxGateway,
}

impl PayerStub {
    pub fn new(config: Arc<HcxConfig>) -> HcxResult<Self> {
        let gateway = HcxGateway::new(&config.payer_outbound_url, config.timeout)?;
        Ok(Self::with_gateway(config, gateway))
    }

    pub fn with_gateway(config: Arc<HcxConfig>, gateway: HcxGateway) -> Self {
        Self { config, gateway }
    }

    pub fn participant_code(&self) -> &str {
        &self.config.payer_code
    }

    fn respond(
        &self,
        request: &HcxEnvelope,
        operation: Operation,
        bundle: &fhir::Bundle,
    ) -> HcxResult<Outbound> {
        Ok(Outbound {
            operation,
            envelope: HcxEnvelope::new(
                request.headers.response_to(HcxStatus::ResponseComplete),
                bundle,
            )?,
        })
    }

    /// Accepts a `coverageeligibility/check` and prepares the `on_check` answer.
    pub fn receive_eligibility_check(
        &self,
        envelope: &HcxEnvelope,
    ) -> HcxResult<(HcxAck, Outbound)> {
        envelope.ensure_recipient(&self.config.payer_code)?;
        let request = envelope.bundle()?;
        tracing::info!(
            "eligibility check from {} for {} (correlation {})",
            envelope.headers.sender_code,
            templates::patient_name(&request).unwrap_or_else(|| "unknown patient".into()),
            envelope.headers.correlation_id
        );

        let response = templates::eligibility_response(&request)?;
        let outbound = self.respond(envelope, Operation::EligibilityOnCheck, &response)?;
        Ok((HcxAck::for_headers(&envelope.headers), outbound))
    }

    /// Accepts a `claim/submit` or `preauth/submit` and prepares the matching `on_submit`.
    ///
    /// The claim's `use` must agree with the endpoint it arrived on.
    pub fn receive_claim(
        &self,
        envelope: &HcxEnvelope,
        expected_use: ClaimUse,
    ) -> HcxResult<(HcxAck, Outbound)> {
        envelope.ensure_recipient(&self.config.payer_code)?;
        let request = envelope.bundle()?;
        let claim: Claim = request.require()?;

        let operation = match (expected_use, claim.claim_use) {
            (ClaimUse::Preauthorization, ClaimUse::Preauthorization) => Operation::PreauthOnSubmit,
            (ClaimUse::Claim, ClaimUse::Claim) => Operation::ClaimOnSubmit,
            (expected, found) => {
                return Err(HcxError::InvalidRequest(format!(
                    "expected a Claim with use {expected:?}, found {found:?}"
                )))
            }
        };

        tracing::info!(
            "{:?} from {} for {} of INR {} (correlation {})",
            claim.claim_use,
            envelope.headers.sender_code,
            templates::referenced_id(&claim.patient),
            claim.claimed_total().value,
            envelope.headers.correlation_id
        );

        let response = templates::claim_response(&request)?;
        let outbound = self.respond(envelope, operation, &response)?;
        Ok((HcxAck::for_headers(&envelope.headers), outbound))
    }

    /// Sends a communication request to the provider.
    ///
    /// A `correlationId` on the form ties the request to an existing claim workflow.
    pub async fn request_communication(&self, form: &CommunicationForm) -> HcxResult<Submission> {
        let bundle = templates::communication_request(form, &parties(&self.config))?;
        let mut headers = HcxHeaders::request(&self.config.payer_code, &self.config.provider_code);
        if let Some(correlation_id) = &form.correlation_id {
            headers.correlation_id = correlation_id.clone();
        }
        if let Some(workflow_id) = &form.workflow_id {
            headers.workflow_id = Some(workflow_id.clone());
        }

        let outbound = Outbound {
            operation: Operation::CommunicationRequest,
            envelope: HcxEnvelope::new(headers, &bundle)?,
        };
        submit(&self.gateway, outbound).await
    }

    /// Logs and acknowledges a provider's `communication/on_request`.
    pub fn receive_communication_reply(&self, envelope: &HcxEnvelope) -> HcxResult<HcxAck> {
        envelope.ensure_recipient(&self.config.payer_code)?;
        let reply: Communication = envelope.bundle()?.require()?;
        tracing::info!(
            "provider {} answered (correlation {}): {}",
            envelope.headers.sender_code,
            envelope.headers.correlation_id,
            reply.text()
        );
        Ok(HcxAck::for_headers(&envelope.headers))
    }

    pub async fn dispatch(&self, outbound: &Outbound) -> HcxResult<Forwarded> {
        self.gateway.send(outbound.operation, &outbound.envelope).await
    }
}
