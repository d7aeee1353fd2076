//! Mapping of core errors onto HTTP responses.
//!
//! Every failure leaves the API as an [`ErrorRes`] JSON body: a `message`, plus `errors`
//! when there is a list and `bundle` when a bundle failed validation.

use api_shared::ErrorRes;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hcx_core::{ConverterError, HcxError};
use hcx_files::FilesError;
use serde_json::Value;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// The converted bundle has entries that are not InsurancePlans.
    Validation { errors: Vec<String>, bundle: Value },
    Converter(ConverterError),
    Hcx(HcxError),
}

impl From<ConverterError> for ApiError {
    fn from(err: ConverterError) -> Self {
        ApiError::Converter(err)
    }
}

impl From<HcxError> for ApiError {
    fn from(err: HcxError) -> Self {
        ApiError::Hcx(err)
    }
}

impl From<fhir::FhirError> for ApiError {
    fn from(err: fhir::FhirError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

fn converter_status(err: &ConverterError) -> StatusCode {
    match err {
        ConverterError::Files(FilesError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
        ConverterError::Files(FilesError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        ConverterError::Files(_)
        | ConverterError::PdfExtraction(_)
        | ConverterError::Workbook(_)
        | ConverterError::NoContent
        | ConverterError::UnexpectedOutput
        | ConverterError::AllEntriesFailed(_)
        | ConverterError::Fhir(_) => StatusCode::BAD_REQUEST,
        ConverterError::Generation(_)
        | ConverterError::GenerationStatus { .. }
        | ConverterError::EmptyGeneration
        | ConverterError::ReplyParse(_)
        | ConverterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn hcx_status(err: &HcxError) -> StatusCode {
    match err {
        HcxError::InvalidRequest(_) | HcxError::Fhir(_) => StatusCode::BAD_REQUEST,
        HcxError::Http(_) | HcxError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        HcxError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Converter(err) => converter_status(err),
            ApiError::Hcx(err) => hcx_status(err),
        }
    }

    fn body(self) -> ErrorRes {
        match self {
            ApiError::BadRequest(message) => ErrorRes::new(message),
            ApiError::Validation { errors, bundle } => ErrorRes::new("Bundle validation failed")
                .with_errors(errors)
                .with_bundle(bundle),
            ApiError::Converter(ConverterError::AllEntriesFailed(errors)) => {
                ErrorRes::new("All generated entries reported errors").with_errors(errors)
            }
            ApiError::Converter(err) => ErrorRes::new(err.to_string()),
            ApiError::Hcx(err) => ErrorRes::new(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed with {status}: {self:?}");
        } else {
            tracing::warn!("request rejected with {status}: {self:?}");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        let cases = [
            (
                ApiError::from(ConverterError::Files(FilesError::UnsupportedFileType(
                    "a.txt".into(),
                ))),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(ConverterError::UnexpectedOutput),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(ConverterError::ReplyParse("eof".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(HcxError::Upstream {
                    status: 500,
                    body: String::new(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::from(HcxError::NotConfigured("FHIR_UTILITY_URL")),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err:?}");
        }
    }

    #[test]
    fn all_entries_failed_lists_every_error() {
        let body = ApiError::from(ConverterError::AllEntriesFailed(vec![
            "a".into(),
            "b".into(),
        ]))
        .body();
        assert_eq!(body.message, "All generated entries reported errors");
        assert_eq!(body.errors, vec!["a", "b"]);
    }
}
