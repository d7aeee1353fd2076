//! Request forms for the stub endpoints.
//!
//! Forms carry just enough to fill a FHIR template; everything else in the generated
//! resources is fixed sample data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetails {
    #[schema(example = "Ramesh Kumar")]
    pub name: String,
    /// ABHA number, recorded as a Patient identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "91-1234-5678-9012")]
    pub abha_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "male")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "1980-05-14")]
    pub birth_date: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityForm {
    pub patient: PatientDetails,
    /// Policy or member number on the patient's insurance.
    #[schema(example = "POL-2024-000123")]
    pub policy_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimLine {
    #[schema(example = "99213")]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Consultation")]
    pub description: Option<String>,
    /// Amount in INR.
    #[schema(example = 1500.0)]
    pub amount: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimForm {
    pub patient: PatientDetails,
    #[schema(example = "POL-2024-000123")]
    pub policy_number: String,
    /// Claim type code from the FHIR claim-type code system; defaults to `institutional`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_type: Option<String>,
    #[serde(default)]
    pub items: Vec<ClaimLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
}

impl ClaimForm {
    /// Sum of line amounts.
    pub fn total(&self) -> f64 {
        self.items.iter().map(|line| line.amount).sum()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationForm {
    #[schema(example = "Please share the discharge summary.")]
    pub message: String,
    /// Correlation id of the claim workflow this request belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    /// Claim the communication is about, as a FHIR reference (`Claim/<id>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_reference: Option<String>,
}

/// The provider's own answer to a payer's communication request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationReply {
    #[schema(example = "Discharge summary attached.")]
    pub message: String,
}

/// Body of `POST /api/provider/communication`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationAnswer {
    /// The payer's `communication/request` envelope, as received.
    #[schema(value_type = Object)]
    pub request: Value,
    pub reply: CommunicationReply,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn claim_form_accepts_camel_case_and_defaults() {
        let form: ClaimForm = serde_json::from_value(json!({
            "patient": {"name": "Asha", "abhaId": "91-0000"},
            "policyNumber": "POL-1",
            "items": [{"code": "A1", "amount": 100.0}, {"code": "B2", "amount": 250.5}]
        }))
        .unwrap();

        assert_eq!(form.patient.abha_id.as_deref(), Some("91-0000"));
        assert_eq!(form.claim_type, None);
        assert_eq!(form.total(), 350.5);
    }

    #[test]
    fn communication_answer_nests_the_reply() {
        let answer: CommunicationAnswer = serde_json::from_value(json!({
            "request": {"payload": {}},
            "reply": {"message": "Report attached"}
        }))
        .unwrap();

        assert_eq!(answer.reply.message, "Report attached");
        assert_eq!(answer.request["payload"], json!({}));
    }
}
