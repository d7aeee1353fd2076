//! Conversions from HCX stub results to response bodies.

use api_shared::{AckRes, ForwardRes};
use hcx_core::hcx::{HcxAck, Outbound, Submission};
use hcx_core::HcxError;

pub fn ack_res(ack: HcxAck) -> AckRes {
    AckRes {
        api_call_id: ack.api_call_id,
        correlation_id: ack.correlation_id,
        timestamp: ack.timestamp,
    }
}

pub fn forward_res(submission: Submission) -> ForwardRes {
    ForwardRes {
        api_call_id: submission.headers.api_call_id,
        correlation_id: submission.headers.correlation_id,
        forwarded_to: submission.url,
        partner_status: submission.forwarded.status,
        partner_response: submission.forwarded.body,
        payload: submission.payload,
    }
}

/// Logs the outcome of an answer posted after the request was acknowledged.
pub fn log_dispatch(outbound: &Outbound, result: Result<hcx_core::hcx::Forwarded, HcxError>) {
    let headers = &outbound.envelope.headers;
    match result {
        Ok(forwarded) => tracing::info!(
            "{} delivered to {} (correlation {}, status {})",
            outbound.operation.path(),
            headers.recipient_code,
            headers.correlation_id,
            forwarded.status
        ),
        Err(e) => tracing::error!(
            "{} to {} failed (correlation {}): {e}",
            outbound.operation.path(),
            headers.recipient_code,
            headers.correlation_id
        ),
    }
}
