//! Converter service routes: upload conversion, bundle validation, the FHIR utility proxy and
//! the IST clock.

use crate::error::{ApiError, ApiResult};
use api_shared::{ConvertRes, ErrorRes, TimestampRes, ValidateRes};
use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use fhir::Resource;
use hcx_core::{ConverterError, FhirUtilityClient, HcxError, InsurancePlanConverter};
use serde_json::Value;
use utoipa::{OpenApi, ToSchema};

/// Slack on top of the file limit for multipart framing and other fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone, FromRef)]
pub struct ConverterState {
    pub converter: InsurancePlanConverter,
    pub fhir_utility: Option<FhirUtilityClient>,
}

impl ConverterState {
    pub fn new(
        converter: InsurancePlanConverter,
        fhir_utility: Option<FhirUtilityClient>,
    ) -> Self {
        Self {
            converter,
            fhir_utility,
        }
    }
}

/// Multipart body of `/api/insurance-plan/convert`.
#[derive(ToSchema)]
pub struct ConvertUpload {
    /// `.xlsx`, `.xls` or `.pdf` document
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health::health,
        convert_insurance_plan,
        validate_bundle,
        forward_fhir_utility,
        timestamp,
    ),
    components(schemas(
        api_shared::HealthRes,
        ConvertUpload,
        ConvertRes,
        ValidateRes,
        TimestampRes,
        ErrorRes,
    ))
)]
pub struct ConverterApi;

pub fn routes(state: ConverterState) -> Router {
    let body_limit = state.converter.config().max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route(
            "/api/insurance-plan/convert",
            post(convert_insurance_plan).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/insurance-plan/validate", post(validate_bundle))
        .route("/api/fhir-utility/*path", post(forward_fhir_utility))
        .route("/api/timestamp", get(timestamp))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/insurance-plan/convert",
    request_body(content = ConvertUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document converted", body = ConvertRes),
        (status = 400, description = "Unsupported file, unreadable document, unexpected AI output or failed validation", body = ErrorRes),
        (status = 413, description = "File too large", body = ErrorRes),
        (status = 500, description = "AI call failed or its reply was not JSON", body = ErrorRes)
    )
)]
/// Convert an insurance-plan document into a FHIR Bundle
///
/// Accepts one multipart field `file`. The document is classified, its text extracted,
/// sent to the configured LLM and the reply normalised into a `collection` bundle of
/// InsurancePlan resources.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - no `file` field is present or the file is not a PDF/workbook,
/// - the model output is not a Bundle, InsurancePlan or array,
/// - every array element carried an `error` key,
/// - an entry is not an InsurancePlan (the bundle and `errors` are returned).
///
/// Returns `500 Internal Server Error` if the model call fails or its reply is not JSON.
#[axum::debug_handler(state = ConverterState)]
async fn convert_insurance_plan(
    State(converter): State<InsurancePlanConverter>,
    mut multipart: Multipart,
) -> ApiResult<Json<ConvertRes>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let media_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
        upload = Some((filename, media_type, bytes.to_vec()));
        break;
    }

    let (filename, media_type, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".into()))?;

    let document = converter.accept(&filename, media_type.as_deref(), bytes)?;
    let conversion = converter.convert(&document).await?;
    let bundle = conversion.bundle.to_value()?;

    if !conversion.is_valid() {
        return Err(ApiError::Validation {
            errors: conversion.errors,
            bundle,
        });
    }

    Ok(Json(ConvertRes {
        message: "Conversion successful".into(),
        bundle,
        skipped: conversion.dropped,
        source: serde_json::to_value(&conversion.source)
            .map_err(|e| ConverterError::Internal(e.to_string()))?,
    }))
}

#[utoipa::path(
    post,
    path = "/api/insurance-plan/validate",
    request_body(content = Object, description = "FHIR Bundle, single InsurancePlan or array of InsurancePlans"),
    responses(
        (status = 200, description = "Validation result", body = ValidateRes),
        (status = 400, description = "Not a Bundle, InsurancePlan or array", body = ErrorRes)
    )
)]
/// Run the converter's bundle check on caller-supplied JSON
#[axum::debug_handler(state = ConverterState)]
async fn validate_bundle(
    State(converter): State<InsurancePlanConverter>,
    Json(body): Json<Value>,
) -> ApiResult<Json<ValidateRes>> {
    let checked = converter.validate_bundle(body)?;
    Ok(Json(ValidateRes {
        valid: checked.is_valid(),
        bundle: checked.bundle.to_value()?,
        errors: checked.errors,
    }))
}

#[utoipa::path(
    post,
    path = "/api/fhir-utility/{path}",
    params(("path" = String, Path, description = "Path below the FHIR utility base URL")),
    request_body(content = Object),
    responses(
        (status = 200, description = "FHIR utility response, relayed with its status code", body = Object),
        (status = 400, description = "Invalid path", body = ErrorRes),
        (status = 502, description = "FHIR utility unreachable", body = ErrorRes),
        (status = 503, description = "FHIR_UTILITY_URL is not set", body = ErrorRes)
    )
)]
/// Forward a JSON payload to the FHIR utility service
#[axum::debug_handler(state = ConverterState)]
async fn forward_fhir_utility(
    State(client): State<Option<FhirUtilityClient>>,
    AxumPath(path): AxumPath<String>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let client = client.ok_or(HcxError::NotConfigured("FHIR_UTILITY_URL"))?;
    let forwarded = client.forward(&path, &body).await?;
    let status = StatusCode::from_u16(forwarded.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(forwarded.body)))
}

#[utoipa::path(
    get,
    path = "/api/timestamp",
    responses(
        (status = 200, description = "Current time in IST", body = TimestampRes)
    )
)]
/// Current time rendered in Indian Standard Time
#[axum::debug_handler]
async fn timestamp() -> Json<TimestampRes> {
    Json(TimestampRes {
        timestamp: hcx_types::ist_timestamp(),
    })
}
