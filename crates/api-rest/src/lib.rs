//! # API REST
//!
//! REST surface for the HCX toolkit.
//!
//! Handles:
//! - the converter service (upload conversion, bundle validation, FHIR utility proxy)
//! - the payer and provider stub endpoints under `/hcx/v1`
//! - OpenAPI/Swagger documentation per service
//! - REST-specific concerns (error mapping, CORS, request tracing)
//!
//! Business logic lives in `hcx-core`; request and response bodies in `api-shared`.

#![warn(rust_2018_idioms)]

pub mod converter;
pub mod error;
pub mod exchange;
pub mod health;
pub mod payer;
pub mod provider;
pub mod services;

pub use converter::ConverterState;
pub use error::{ApiError, ApiResult};
pub use services::Services;

use api_shared::HealthService;
use axum::{routing::get, Router};
use hcx_core::{PayerStub, ProviderStub};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Adds `/health`, Swagger UI and the shared layers to a service's routes.
fn service(routes: Router, name: &'static str, doc: utoipa::openapi::OpenApi) -> Router {
    routes
        .merge(
            Router::new()
                .route("/health", get(health::health))
                .with_state(HealthService::new(name)),
        )
        .merge(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", doc))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// The converter API: `/api/insurance-plan/*`, `/api/fhir-utility/*` and `/api/timestamp`.
pub fn converter_app(state: ConverterState) -> Router {
    service(
        converter::routes(state),
        "converter",
        converter::ConverterApi::openapi(),
    )
}

/// The payer stub: receives provider requests and answers them asynchronously.
pub fn payer_app(payer: PayerStub) -> Router {
    service(payer::routes(payer), "payer", payer::PayerApi::openapi())
}

/// The provider stub: starts exchanges from forms and receives payer callbacks.
pub fn provider_app(provider: ProviderStub) -> Router {
    service(
        provider::routes(provider),
        "provider",
        provider::ProviderApi::openapi(),
    )
}

/// All three services on one listener, sharing a single `/health` and API document.
///
/// The payer and provider route sets do not overlap, so a single process can play both
/// sides of an exchange when both outbound URLs point back at it.
pub fn combined_app(state: ConverterState, payer: PayerStub, provider: ProviderStub) -> Router {
    let mut doc = converter::ConverterApi::openapi();
    doc.merge(payer::PayerApi::openapi());
    doc.merge(provider::ProviderApi::openapi());

    let routes = converter::routes(state)
        .merge(payer::routes(payer))
        .merge(provider::routes(provider));

    service(routes, "hcx", doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_shared::{EligibilityForm, PatientDetails};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use hcx_core::hcx::{templates, HcxEnvelope, HcxHeaders, Parties};
    use async_trait::async_trait;
    use hcx_core::error::ConverterResult;
    use hcx_core::{
        ConverterConfig, GenerationClient, HcxConfig, InsurancePlanConverter, UnconfiguredClient,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "hcx-test-boundary";

    fn converter_state() -> ConverterState {
        let converter = InsurancePlanConverter::new(
            Arc::new(ConverterConfig::default()),
            Arc::new(UnconfiguredClient::new("tests")),
        );
        ConverterState::new(converter, None)
    }

    /// Answers every prompt with the same text.
    struct Canned(&'static str);

    #[async_trait]
    impl GenerationClient for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn generate(&self, _prompt: &str) -> ConverterResult<String> {
            Ok(self.0.to_string())
        }
    }

    fn canned_state(reply: &'static str) -> ConverterState {
        let converter = InsurancePlanConverter::new(
            Arc::new(ConverterConfig::default()),
            Arc::new(Canned(reply)),
        );
        ConverterState::new(converter, None)
    }

    fn plan_workbook() -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Plan Name").unwrap();
        sheet.write_string(0, 1, "Sum Insured").unwrap();
        sheet.write_string(1, 0, "Gold Family Floater").unwrap();
        sheet.write_number(1, 1, 500000.0).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

    /// Config whose outbound calls go nowhere; answers dispatched in the background fail
    /// quietly.
    fn offline_hcx() -> Arc<HcxConfig> {
        Arc::new(HcxConfig {
            provider_outbound_url: "http://127.0.0.1:9/hcx/v1".into(),
            payer_outbound_url: "http://127.0.0.1:9/hcx/v1".into(),
            ..HcxConfig::default()
        })
    }

    fn eligibility_form() -> EligibilityForm {
        EligibilityForm {
            patient: PatientDetails {
                name: "Asha Verma".into(),
                abha_id: Some("91-1111-2222-3333".into()),
                ..PatientDetails::default()
            },
            policy_number: "POL-77".into(),
            ..EligibilityForm::default()
        }
    }

    fn eligibility_envelope(config: &HcxConfig, recipient: &str) -> Value {
        let parties = Parties {
            provider_code: config.provider_code.clone(),
            payer_code: config.payer_code.clone(),
        };
        let bundle = templates::eligibility_request(&eligibility_form(), &parties).unwrap();
        let headers = HcxHeaders::request(&config.provider_code, recipient);
        serde_json::to_value(HcxEnvelope::new(headers, &bundle).unwrap()).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload(filename: &str, content_type: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/insurance-plan/convert")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn text_upload_is_rejected_as_unsupported() {
        let (status, body) = send(
            converter_app(converter_state()),
            upload("notes.txt", "text/plain", b"plain notes"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Unsupported file type"));
    }

    #[tokio::test]
    async fn workbook_converts_to_insurance_plan_bundle() {
        let reply = "Here you go:\n```json\n{\"resourceType\": \"InsurancePlan\", \"name\": \"Gold Family Floater\"}\n```";
        let (status, body) = send(
            converter_app(canned_state(reply)),
            upload("plans.xlsx", XLSX, &plan_workbook()),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["message"], "Conversion successful");
        assert_eq!(body["bundle"]["resourceType"], "Bundle");
        assert_eq!(body["bundle"]["type"], "collection");
        assert_eq!(
            body["bundle"]["entry"][0]["resource"]["name"],
            "Gold Family Floater"
        );
        assert_eq!(body["source"]["originalFilename"], "plans.xlsx");
    }

    #[tokio::test]
    async fn converted_bundle_with_foreign_entry_is_returned_with_errors() {
        let reply = r#"{"resourceType": "Bundle", "type": "collection", "entry": [
            {"resource": {"resourceType": "InsurancePlan", "name": "Gold"}},
            {"resource": {"resourceType": "Organization", "name": "Acme Health"}}
        ]}"#;
        let (status, body) = send(
            converter_app(canned_state(reply)),
            upload("plans.xlsx", XLSX, &plan_workbook()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Bundle validation failed");
        assert_eq!(
            body["errors"],
            json!(["Entry 1: expected resourceType InsurancePlan, found Organization"])
        );
        assert_eq!(body["bundle"]["entry"][1]["resource"]["name"], "Acme Health");
    }

    #[tokio::test]
    async fn convert_without_file_field_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/insurance-plan/convert")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{BOUNDARY}--\r\n"
            )))
            .unwrap();

        let (status, body) = send(converter_app(converter_state()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No file uploaded");
    }

    #[tokio::test]
    async fn validate_flags_entries_that_are_not_insurance_plans() {
        let bundle = json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [
                {"resource": {"resourceType": "InsurancePlan", "name": "Gold"}},
                {"resource": {"resourceType": "Organization", "name": "Acme"}}
            ]
        });

        let (status, body) = send(
            converter_app(converter_state()),
            post_json("/api/insurance-plan/validate", &bundle),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
        assert_eq!(
            body["errors"],
            json!(["Entry 1: expected resourceType InsurancePlan, found Organization"])
        );
    }

    #[tokio::test]
    async fn validate_lists_every_error_when_all_entries_failed() {
        let generated = json!([
            {"error": "Sheet 'Gold' has no premium column"},
            {"error": "Sheet 'Silver' is empty"}
        ]);

        let (status, body) = send(
            converter_app(converter_state()),
            post_json("/api/insurance-plan/validate", &generated),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "All generated entries reported errors");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn timestamp_is_rendered_in_ist() {
        let request = Request::builder()
            .uri("/api/timestamp")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(converter_app(converter_state()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["timestamp"].as_str().unwrap().ends_with("+05:30"));
    }

    #[tokio::test]
    async fn fhir_utility_proxy_is_unavailable_without_url() {
        let (status, body) = send(
            converter_app(converter_state()),
            post_json("/api/fhir-utility/fhir/validate", &json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["message"].as_str().unwrap().contains("FHIR_UTILITY_URL"));
    }

    #[tokio::test]
    async fn each_service_reports_its_own_health() {
        let request = || Request::builder().uri("/health").body(Body::empty()).unwrap();
        let config = offline_hcx();

        let (_, payer) = send(payer_app(PayerStub::new(config.clone()).unwrap()), request()).await;
        let (_, combined) = send(
            combined_app(
                converter_state(),
                PayerStub::new(config.clone()).unwrap(),
                ProviderStub::new(config).unwrap(),
            ),
            request(),
        )
        .await;

        assert_eq!(payer["service"], "payer");
        assert_eq!(combined["service"], "hcx");
    }

    #[tokio::test]
    async fn payer_acknowledges_eligibility_check_with_callers_correlation_id() {
        let config = offline_hcx();
        let envelope = eligibility_envelope(&config, &config.payer_code);

        let (status, body) = send(
            payer_app(PayerStub::new(config).unwrap()),
            post_json("/hcx/v1/coverageeligibility/check", &envelope),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(
            body["x-hcx-correlation_id"],
            envelope["x-hcx-correlation_id"]
        );
        assert_eq!(body["x-hcx-api_call_id"], envelope["x-hcx-api_call_id"]);
    }

    #[tokio::test]
    async fn payer_rejects_envelope_addressed_elsewhere() {
        let config = offline_hcx();
        let envelope = eligibility_envelope(&config, "someone-else");

        let (status, body) = send(
            payer_app(PayerStub::new(config).unwrap()),
            post_json("/hcx/v1/coverageeligibility/check", &envelope),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("someone-else"));
    }

    #[tokio::test]
    async fn provider_eligibility_round_trips_through_payer_stub() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let payer_base = format!("http://{}/hcx/v1", listener.local_addr().unwrap());

        let config = Arc::new(HcxConfig {
            provider_outbound_url: payer_base.clone(),
            payer_outbound_url: "http://127.0.0.1:9/hcx/v1".into(),
            ..HcxConfig::default()
        });
        let payer = payer_app(PayerStub::new(config.clone()).unwrap());
        tokio::spawn(async move {
            axum::serve(listener, payer).await.unwrap();
        });

        let (status, body) = send(
            provider_app(ProviderStub::new(config).unwrap()),
            post_json(
                "/api/provider/eligibility",
                &serde_json::to_value(eligibility_form()).unwrap(),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["partnerStatus"], 202);
        assert_eq!(
            body["forwardedTo"],
            format!("{payer_base}/coverageeligibility/check")
        );
        assert_eq!(
            body["partnerResponse"]["x-hcx-correlation_id"],
            body["correlationId"]
        );
        assert_eq!(body["payload"]["type"], "collection");
    }

    #[tokio::test]
    async fn provider_claim_without_items_is_bad_request() {
        let form = json!({
            "patient": {"name": "Asha Verma"},
            "policyNumber": "POL-77",
            "items": []
        });

        let (status, _) = send(
            provider_app(ProviderStub::new(offline_hcx()).unwrap()),
            post_json("/api/provider/claim", &form),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    fn communication_envelope(config: &HcxConfig) -> Value {
        let parties = Parties {
            provider_code: config.provider_code.clone(),
            payer_code: config.payer_code.clone(),
        };
        let bundle = templates::communication_request(
            &api_shared::CommunicationForm {
                message: "Please share the discharge summary.".into(),
                ..Default::default()
            },
            &parties,
        )
        .unwrap();
        let headers = HcxHeaders::request(&config.payer_code, &config.provider_code);
        serde_json::to_value(HcxEnvelope::new(headers, &bundle).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn provider_acknowledges_communication_request() {
        let config = offline_hcx();
        let envelope = communication_envelope(&config);

        let (status, body) = send(
            provider_app(ProviderStub::new(config).unwrap()),
            post_json("/hcx/v1/communication/request", &envelope),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(
            body["x-hcx-correlation_id"],
            envelope["x-hcx-correlation_id"]
        );
    }

    #[tokio::test]
    async fn provider_answer_reaches_payer_on_request_correlation() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let payer_base = format!("http://{}/hcx/v1", listener.local_addr().unwrap());

        let config = Arc::new(HcxConfig {
            provider_outbound_url: payer_base.clone(),
            payer_outbound_url: "http://127.0.0.1:9/hcx/v1".into(),
            ..HcxConfig::default()
        });
        let payer = payer_app(PayerStub::new(config.clone()).unwrap());
        tokio::spawn(async move {
            axum::serve(listener, payer).await.unwrap();
        });
        let request = communication_envelope(&config);

        let (status, body) = send(
            provider_app(ProviderStub::new(config).unwrap()),
            post_json(
                "/api/provider/communication",
                &json!({
                    "request": request,
                    "reply": {"message": "Discharge summary attached."}
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["partnerStatus"], 202);
        assert_eq!(
            body["forwardedTo"],
            format!("{payer_base}/communication/on_request")
        );
        assert_eq!(body["correlationId"], request["x-hcx-correlation_id"]);
        assert!(body["payload"]
            .to_string()
            .contains("Discharge summary attached."));
    }

    #[tokio::test]
    async fn provider_answer_needs_an_hcx_envelope() {
        let (status, body) = send(
            provider_app(ProviderStub::new(offline_hcx()).unwrap()),
            post_json(
                "/api/provider/communication",
                &json!({"request": {"payload": {}}, "reply": {"message": "hi"}}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("request is not an HCX envelope"));
    }

    #[test]
    fn combined_document_lists_every_service() {
        let mut doc = converter::ConverterApi::openapi();
        doc.merge(payer::PayerApi::openapi());
        doc.merge(provider::ProviderApi::openapi());

        for path in [
            "/api/insurance-plan/convert",
            "/hcx/v1/claim/submit",
            "/api/provider/preauth",
            "/api/provider/communication",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
