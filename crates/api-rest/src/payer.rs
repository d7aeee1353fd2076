//! Payer stub routes.
//!
//! Incoming HCX requests are acknowledged with `202 Accepted` straight away; the answer is
//! posted back to the provider side from a background task.

use crate::error::ApiResult;
use crate::exchange::{ack_res, forward_res, log_dispatch};
use api_shared::{AckRes, CommunicationForm, ErrorRes, ForwardRes};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use fhir::ClaimUse;
use hcx_core::hcx::{HcxEnvelope, Outbound};
use hcx_core::PayerStub;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health::health,
        eligibility_check,
        claim_submit,
        preauth_submit,
        communication_on_request,
        request_communication,
    ),
    components(schemas(api_shared::HealthRes, AckRes, CommunicationForm, ForwardRes, ErrorRes))
)]
pub struct PayerApi;

pub fn routes(payer: PayerStub) -> Router {
    Router::new()
        .route("/hcx/v1/coverageeligibility/check", post(eligibility_check))
        .route("/hcx/v1/claim/submit", post(claim_submit))
        .route("/hcx/v1/preauth/submit", post(preauth_submit))
        .route("/hcx/v1/communication/on_request", post(communication_on_request))
        .route("/api/payer/communication", post(request_communication))
        .with_state(payer)
}

fn answer_later(payer: PayerStub, outbound: Outbound) {
    tokio::spawn(async move {
        let result = payer.dispatch(&outbound).await;
        log_dispatch(&outbound, result);
    });
}

#[utoipa::path(
    post,
    path = "/hcx/v1/coverageeligibility/check",
    request_body(content = Object, description = "HCX envelope carrying a CoverageEligibilityRequest bundle"),
    responses(
        (status = 202, description = "Accepted; the response follows on coverageeligibility/on_check", body = AckRes),
        (status = 400, description = "Wrong recipient or malformed bundle", body = ErrorRes)
    )
)]
/// Receive a coverage eligibility check
#[axum::debug_handler]
async fn eligibility_check(
    State(payer): State<PayerStub>,
    Json(envelope): Json<HcxEnvelope>,
) -> ApiResult<(StatusCode, Json<AckRes>)> {
    let (ack, outbound) = payer.receive_eligibility_check(&envelope)?;
    answer_later(payer, outbound);
    Ok((StatusCode::ACCEPTED, Json(ack_res(ack))))
}

#[utoipa::path(
    post,
    path = "/hcx/v1/claim/submit",
    request_body(content = Object, description = "HCX envelope carrying a Claim bundle"),
    responses(
        (status = 202, description = "Accepted; the response follows on claim/on_submit", body = AckRes),
        (status = 400, description = "Wrong recipient or malformed bundle", body = ErrorRes)
    )
)]
/// Receive a claim
#[axum::debug_handler]
async fn claim_submit(
    State(payer): State<PayerStub>,
    Json(envelope): Json<HcxEnvelope>,
) -> ApiResult<(StatusCode, Json<AckRes>)> {
    let (ack, outbound) = payer.receive_claim(&envelope, ClaimUse::Claim)?;
    answer_later(payer, outbound);
    Ok((StatusCode::ACCEPTED, Json(ack_res(ack))))
}

#[utoipa::path(
    post,
    path = "/hcx/v1/preauth/submit",
    request_body(content = Object, description = "HCX envelope carrying a pre-authorisation Claim bundle"),
    responses(
        (status = 202, description = "Accepted; the response follows on preauth/on_submit", body = AckRes),
        (status = 400, description = "Wrong recipient or malformed bundle", body = ErrorRes)
    )
)]
/// Receive a pre-authorisation request
#[axum::debug_handler]
async fn preauth_submit(
    State(payer): State<PayerStub>,
    Json(envelope): Json<HcxEnvelope>,
) -> ApiResult<(StatusCode, Json<AckRes>)> {
    let (ack, outbound) = payer.receive_claim(&envelope, ClaimUse::Preauthorization)?;
    answer_later(payer, outbound);
    Ok((StatusCode::ACCEPTED, Json(ack_res(ack))))
}

#[utoipa::path(
    post,
    path = "/hcx/v1/communication/on_request",
    request_body(content = Object, description = "HCX envelope carrying the provider's Communication"),
    responses(
        (status = 202, description = "Reply received", body = AckRes),
        (status = 400, description = "Wrong recipient or malformed bundle", body = ErrorRes)
    )
)]
/// Receive a provider's answer to a communication request
#[axum::debug_handler]
async fn communication_on_request(
    State(payer): State<PayerStub>,
    Json(envelope): Json<HcxEnvelope>,
) -> ApiResult<(StatusCode, Json<AckRes>)> {
    let ack = payer.receive_communication_reply(&envelope)?;
    Ok((StatusCode::ACCEPTED, Json(ack_res(ack))))
}

#[utoipa::path(
    post,
    path = "/api/payer/communication",
    request_body = CommunicationForm,
    responses(
        (status = 200, description = "Communication request forwarded", body = ForwardRes),
        (status = 400, description = "Empty message", body = ErrorRes),
        (status = 502, description = "Provider side unreachable or rejected the request", body = ErrorRes)
    )
)]
/// Ask the provider for more information
#[axum::debug_handler]
async fn request_communication(
    State(payer): State<PayerStub>,
    Json(form): Json<CommunicationForm>,
) -> ApiResult<Json<ForwardRes>> {
    let submission = payer.request_communication(&form).await?;
    Ok(Json(forward_res(submission)))
}
