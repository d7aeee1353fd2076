//! FHIR R4 wire models for the HCX toolkit.
//!
//! This crate provides **passive data-transfer shapes** for the resources exchanged over HCX:
//! - `CoverageEligibilityRequest` / `CoverageEligibilityResponse`
//! - `Claim` / `ClaimResponse` (claims and pre-authorisation)
//! - `Communication`
//! - `InsurancePlan` and the `Bundle` container
//! - the administrative resources referenced from those bundles (`Patient`, `Organization`,
//!   `Coverage`)
//!
//! No FHIR validation is performed here beyond the `resourceType` discriminator. The shapes
//! are constructed, serialised to JSON and sent, or received and handed back.

pub mod administrative;
pub mod bundle;
pub mod claim;
pub mod communication;
pub mod coverage_eligibility;
pub mod datatypes;
pub mod insurance_plan;

pub use administrative::{Coverage, HumanName, Organization, Patient};
pub use bundle::{Bundle, BundleEntry, BundleType};
pub use claim::{
    Claim, ClaimInsurance, ClaimItem, ClaimResponse, ClaimResponseTotal, ClaimUse, Outcome,
};
pub use communication::{Communication, CommunicationPayload, CommunicationStatus};
pub use coverage_eligibility::{
    CoverageEligibilityRequest, CoverageEligibilityResponse, EligibilityInsurance,
    EligibilityPurpose, EligibilityResponseInsurance,
};
pub use datatypes::{
    CodeableConcept, Coding, FinancialStatus, Identifier, Meta, Money, Period, Reference,
};
pub use insurance_plan::InsurancePlan;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Identifier system used for ABHA (Ayushman Bharat Health Account) numbers.
pub const ABHA_IDENTIFIER_SYSTEM: &str = "https://healthid.ndhm.gov.in";

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("expected resourceType {expected}, found {found}")]
    UnexpectedResourceType { expected: String, found: String },

    #[error("invalid JSON at {path}: {message}")]
    InvalidJson { path: String, message: String },

    #[error("JSON serialisation failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;

/// Reads the `resourceType` discriminator of a JSON value, if present.
pub fn resource_type_of(value: &Value) -> Option<&str> {
    value.get("resourceType").and_then(Value::as_str)
}

/// A FHIR resource with a fixed `resourceType`.
///
/// The discriminator is not a struct field; it is written by [`Resource::to_value`] and
/// checked by [`Resource::from_value`].
pub trait Resource: Serialize + DeserializeOwned {
    const RESOURCE_TYPE: &'static str;

    fn to_value(&self) -> FhirResult<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.insert(
                "resourceType".into(),
                Value::String(Self::RESOURCE_TYPE.into()),
            );
        }
        Ok(value)
    }

    fn from_value(mut value: Value) -> FhirResult<Self> {
        match resource_type_of(&value) {
            Some(found) if found == Self::RESOURCE_TYPE => {}
            other => {
                return Err(FhirError::UnexpectedResourceType {
                    expected: Self::RESOURCE_TYPE.into(),
                    found: other.unwrap_or("<missing>").into(),
                })
            }
        }

        // Flattened catch-all maps would otherwise capture the discriminator.
        if let Value::Object(map) = &mut value {
            map.remove("resourceType");
        }

        serde_path_to_error::deserialize(value).map_err(|e| FhirError::InvalidJson {
            path: e.path().to_string(),
            message: e.inner().to_string(),
        })
    }
}

/// Builds a `urn:uuid:` full URL for a bundle entry.
pub fn urn_uuid(id: &uuid::Uuid) -> String {
    format!("urn:uuid:{id}")
}
