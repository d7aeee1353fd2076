//! HCX payer and provider stubs.
//!
//! Both stubs build FHIR bundles from [`templates`], wrap them in an [`HcxEnvelope`] and post
//! them to their partner through an [`HcxGateway`]. Incoming calls are checked for the right
//! recipient, logged and acknowledged; where the workflow needs an answer the stub prepares an
//! [`Outbound`] envelope that the caller dispatches, usually after acknowledging.

pub mod gateway;
pub mod payer;
pub mod protocol;
pub mod provider;
pub mod templates;

pub use gateway::{Forwarded, HcxGateway, Operation};
pub use payer::PayerStub;
pub use protocol::{HcxAck, HcxEnvelope, HcxHeaders, HcxStatus};
pub use provider::ProviderStub;
pub use templates::Parties;

use crate::config::HcxConfig;
use crate::error::HcxResult;
use serde_json::Value;

/// An envelope ready to be posted to a partner.
#[derive(Clone, Debug, PartialEq)]
pub struct Outbound {
    pub operation: Operation,
    pub envelope: HcxEnvelope,
}

/// A request a stub initiated and what the partner said.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub headers: HcxHeaders,
    pub url: String,
    pub forwarded: Forwarded,
    /// The bundle that was sent.
    pub payload: Value,
}

fn parties(config: &HcxConfig) -> Parties {
    Parties {
        provider_code: config.provider_code.clone(),
        payer_code: config.payer_code.clone(),
    }
}

/// Posts a freshly built request and records what was sent.
async fn submit(gateway: &HcxGateway, outbound: Outbound) -> HcxResult<Submission> {
    let url = gateway.url_for(outbound.operation);
    let forwarded = gateway.send(outbound.operation, &outbound.envelope).await?;
    Ok(Submission {
        headers: outbound.envelope.headers,
        url,
        forwarded,
        payload: outbound.envelope.payload,
    })
}
