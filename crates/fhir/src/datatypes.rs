//! Shared FHIR R4 datatypes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A code from a terminology system.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A concept expressed by one or more codings plus optional free text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// Concept with a single coding.
    pub fn coded(system: &str, code: &str, display: Option<&str>) -> Self {
        Self {
            coding: vec![Coding {
                system: Some(system.into()),
                code: Some(code.into()),
                display: display.map(str::to_owned),
            }],
            text: None,
        }
    }

    /// Concept carrying only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            coding: Vec::new(),
            text: Some(text.into()),
        }
    }

    /// Code of the first coding, if any.
    pub fn first_code(&self) -> Option<&str> {
        self.coding.first().and_then(|c| c.code.as_deref())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Identifier {
    pub fn new(system: &str, value: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            value: Some(value.into()),
        }
    }
}

/// A literal reference to another resource (`ResourceType/id` or `urn:uuid:...`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    /// Reference to `resource_type/id`.
    pub fn to(resource_type: &str, id: &str) -> Self {
        Self {
            reference: Some(format!("{resource_type}/{id}")),
            display: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

/// An amount of money. Currency defaults to INR in the stubs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub value: f64,
    pub currency: String,
}

impl Money {
    pub fn inr(value: f64) -> Self {
        Self {
            value,
            currency: "INR".into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// Resource metadata. Only the fields the toolkit touches are modelled; the rest is kept in
/// `extra`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Meta {
    pub fn with_profile(profile: impl Into<String>) -> Self {
        Self {
            last_updated: None,
            profile: vec![profile.into()],
            extra: Map::new(),
        }
    }
}

/// Status shared by the financial resources (Claim, ClaimResponse, Coverage and the
/// eligibility pair).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinancialStatus {
    #[default]
    Active,
    Cancelled,
    Draft,
    EnteredInError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omits_absent_fields() {
        let concept = CodeableConcept::coded("http://example.org/cs", "OPD", None);
        let value = serde_json::to_value(&concept).unwrap();
        assert_eq!(
            value,
            json!({"coding": [{"system": "http://example.org/cs", "code": "OPD"}]})
        );
    }

    #[test]
    fn financial_status_uses_fhir_codes() {
        let value = serde_json::to_value(FinancialStatus::EnteredInError).unwrap();
        assert_eq!(value, json!("entered-in-error"));
        let parsed: FinancialStatus = serde_json::from_value(json!("active")).unwrap();
        assert_eq!(parsed, FinancialStatus::Active);
    }

    #[test]
    fn reference_formats_type_and_id() {
        let reference = Reference::to("Patient", "p-1").with_display("Asha Rao");
        assert_eq!(reference.reference.as_deref(), Some("Patient/p-1"));
        assert_eq!(reference.display.as_deref(), Some("Asha Rao"));
    }
}
