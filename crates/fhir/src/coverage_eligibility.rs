//! CoverageEligibilityRequest and CoverageEligibilityResponse resources.

use crate::{FinancialStatus, Identifier, Meta, Outcome, Reference, Resource};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EligibilityPurpose {
    AuthRequirements,
    Benefits,
    Discovery,
    Validation,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityInsurance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal: Option<bool>,
    pub coverage: Reference,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageEligibilityRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    #[serde(default)]
    pub status: FinancialStatus,
    #[serde(default)]
    pub purpose: Vec<EligibilityPurpose>,
    #[serde(default)]
    pub patient: Reference,
    #[serde(default)]
    pub created: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Reference>,
    #[serde(default)]
    pub insurer: Reference,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insurance: Vec<EligibilityInsurance>,
}

impl Resource for CoverageEligibilityRequest {
    const RESOURCE_TYPE: &'static str = "CoverageEligibilityRequest";
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponseInsurance {
    pub coverage: Reference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inforce: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageEligibilityResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default)]
    pub status: FinancialStatus,
    #[serde(default)]
    pub purpose: Vec<EligibilityPurpose>,
    #[serde(default)]
    pub patient: Reference,
    #[serde(default)]
    pub created: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Reference>,
    #[serde(default)]
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,
    #[serde(default)]
    pub insurer: Reference,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insurance: Vec<EligibilityResponseInsurance>,
}

impl Resource for CoverageEligibilityResponse {
    const RESOURCE_TYPE: &'static str = "CoverageEligibilityResponse";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn purpose_codes_are_kebab_case() {
        let request = CoverageEligibilityRequest {
            purpose: vec![
                EligibilityPurpose::AuthRequirements,
                EligibilityPurpose::Benefits,
            ],
            ..CoverageEligibilityRequest::default()
        };
        let value = request.to_value().unwrap();
        assert_eq!(value["purpose"], json!(["auth-requirements", "benefits"]));
        assert_eq!(value["resourceType"], "CoverageEligibilityRequest");
    }

    #[test]
    fn response_parses_outcome_and_inforce() {
        let response = CoverageEligibilityResponse::from_value(json!({
            "resourceType": "CoverageEligibilityResponse",
            "status": "active",
            "purpose": ["validation"],
            "patient": {"reference": "Patient/p-1"},
            "created": "2024-05-01T10:00:00.000+05:30",
            "outcome": "complete",
            "insurer": {"reference": "Organization/payer"},
            "insurance": [{"coverage": {"reference": "Coverage/c-1"}, "inforce": true}]
        }))
        .unwrap();

        assert_eq!(response.outcome, Outcome::Complete);
        assert_eq!(response.insurance[0].inforce, Some(true));
    }
}
