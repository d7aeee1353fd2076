//! Provider stub routes: form-driven requests out, payer callbacks in.

use crate::error::{ApiError, ApiResult};
use crate::exchange::{ack_res, forward_res, log_dispatch};
use api_shared::{
    AckRes, ClaimForm, CommunicationAnswer, CommunicationReply, EligibilityForm, ErrorRes,
    ForwardRes,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use hcx_core::hcx::HcxEnvelope;
use hcx_core::ProviderStub;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health::health,
        check_eligibility,
        submit_claim,
        submit_preauth,
        answer_communication,
        callback,
        communication_request,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::PatientDetails,
        api_shared::ClaimLine,
        EligibilityForm,
        ClaimForm,
        CommunicationReply,
        CommunicationAnswer,
        AckRes,
        ForwardRes,
        ErrorRes,
    ))
)]
pub struct ProviderApi;

pub fn routes(provider: ProviderStub) -> Router {
    Router::new()
        .route("/api/provider/eligibility", post(check_eligibility))
        .route("/api/provider/claim", post(submit_claim))
        .route("/api/provider/preauth", post(submit_preauth))
        .route("/api/provider/communication", post(answer_communication))
        .route("/hcx/v1/coverageeligibility/on_check", post(callback))
        .route("/hcx/v1/claim/on_submit", post(callback))
        .route("/hcx/v1/preauth/on_submit", post(callback))
        .route("/hcx/v1/communication/request", post(communication_request))
        .with_state(provider)
}

#[utoipa::path(
    post,
    path = "/api/provider/eligibility",
    request_body = EligibilityForm,
    responses(
        (status = 200, description = "Eligibility check forwarded", body = ForwardRes),
        (status = 502, description = "Payer side unreachable or rejected the request", body = ErrorRes)
    )
)]
/// Start a coverage eligibility check
#[axum::debug_handler]
async fn check_eligibility(
    State(provider): State<ProviderStub>,
    Json(form): Json<EligibilityForm>,
) -> ApiResult<Json<ForwardRes>> {
    Ok(Json(forward_res(provider.check_eligibility(&form).await?)))
}

#[utoipa::path(
    post,
    path = "/api/provider/claim",
    request_body = ClaimForm,
    responses(
        (status = 200, description = "Claim forwarded", body = ForwardRes),
        (status = 400, description = "Claim has no items", body = ErrorRes),
        (status = 502, description = "Payer side unreachable or rejected the request", body = ErrorRes)
    )
)]
/// Submit a claim
#[axum::debug_handler]
async fn submit_claim(
    State(provider): State<ProviderStub>,
    Json(form): Json<ClaimForm>,
) -> ApiResult<Json<ForwardRes>> {
    Ok(Json(forward_res(provider.submit_claim(&form).await?)))
}

#[utoipa::path(
    post,
    path = "/api/provider/preauth",
    request_body = ClaimForm,
    responses(
        (status = 200, description = "Pre-authorisation forwarded", body = ForwardRes),
        (status = 400, description = "Request has no items", body = ErrorRes),
        (status = 502, description = "Payer side unreachable or rejected the request", body = ErrorRes)
    )
)]
/// Submit a pre-authorisation request
#[axum::debug_handler]
async fn submit_preauth(
    State(provider): State<ProviderStub>,
    Json(form): Json<ClaimForm>,
) -> ApiResult<Json<ForwardRes>> {
    Ok(Json(forward_res(provider.submit_preauth(&form).await?)))
}

#[utoipa::path(
    post,
    path = "/api/provider/communication",
    request_body = CommunicationAnswer,
    responses(
        (status = 200, description = "Answer posted on communication/on_request", body = ForwardRes),
        (status = 400, description = "Malformed request envelope, wrong recipient or empty message", body = ErrorRes),
        (status = 502, description = "Payer side unreachable or rejected the answer", body = ErrorRes)
    )
)]
/// Answer a payer's communication request
#[axum::debug_handler]
async fn answer_communication(
    State(provider): State<ProviderStub>,
    Json(answer): Json<CommunicationAnswer>,
) -> ApiResult<Json<ForwardRes>> {
    let request: HcxEnvelope = serde_json::from_value(answer.request)
        .map_err(|e| ApiError::BadRequest(format!("request is not an HCX envelope: {e}")))?;
    let submission = provider
        .respond_communication(&request, &answer.reply)
        .await?;
    Ok(Json(forward_res(submission)))
}

#[utoipa::path(
    post,
    path = "/hcx/v1/claim/on_submit",
    request_body(content = Object, description = "HCX envelope carrying a ClaimResponse or CoverageEligibilityResponse bundle"),
    responses(
        (status = 202, description = "Callback received", body = AckRes),
        (status = 400, description = "Wrong recipient or malformed bundle", body = ErrorRes)
    )
)]
/// Receive a payer callback
///
/// Serves `coverageeligibility/on_check`, `claim/on_submit` and `preauth/on_submit`.
#[axum::debug_handler]
async fn callback(
    State(provider): State<ProviderStub>,
    Json(envelope): Json<HcxEnvelope>,
) -> ApiResult<(StatusCode, Json<AckRes>)> {
    let ack = provider.receive_callback(&envelope)?;
    Ok((StatusCode::ACCEPTED, Json(ack_res(ack))))
}

#[utoipa::path(
    post,
    path = "/hcx/v1/communication/request",
    request_body(content = Object, description = "HCX envelope carrying the payer's Communication"),
    responses(
        (status = 202, description = "Accepted; the answer follows on communication/on_request", body = AckRes),
        (status = 400, description = "Wrong recipient or malformed bundle", body = ErrorRes)
    )
)]
/// Receive a payer's request for more information
#[axum::debug_handler]
async fn communication_request(
    State(provider): State<ProviderStub>,
    Json(envelope): Json<HcxEnvelope>,
) -> ApiResult<(StatusCode, Json<AckRes>)> {
    let (ack, outbound) = provider.receive_communication_request(&envelope)?;
    tokio::spawn(async move {
        let result = provider.dispatch(&outbound).await;
        log_dispatch(&outbound, result);
    });
    Ok((StatusCode::ACCEPTED, Json(ack_res(ack))))
}
