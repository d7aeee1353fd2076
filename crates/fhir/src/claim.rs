//! Claim and ClaimResponse resources.
//!
//! The same `Claim` shape carries both claims and pre-authorisation requests; the two are
//! told apart by [`ClaimUse`].

use crate::{CodeableConcept, FinancialStatus, Identifier, Meta, Money, Reference, Resource};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimUse {
    #[default]
    Claim,
    Preauthorization,
    Predetermination,
}

/// Processing outcome shared by ClaimResponse and CoverageEligibilityResponse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Queued,
    Complete,
    Error,
    Partial,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimInsurance {
    pub sequence: u32,
    pub focal: bool,
    pub coverage: Reference,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimItem {
    pub sequence: u32,
    pub product_or_service: CodeableConcept,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<Money>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    #[serde(default)]
    pub status: FinancialStatus,
    #[serde(rename = "type", default)]
    pub claim_type: CodeableConcept,
    #[serde(rename = "use", default)]
    pub claim_use: ClaimUse,
    #[serde(default)]
    pub patient: Reference,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub insurer: Reference,
    #[serde(default)]
    pub provider: Reference,
    #[serde(default)]
    pub priority: CodeableConcept,
    #[serde(default)]
    pub insurance: Vec<ClaimInsurance>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item: Vec<ClaimItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
}

impl Resource for Claim {
    const RESOURCE_TYPE: &'static str = "Claim";
}

impl Claim {
    /// Claimed total: `total` when present, otherwise the sum of item nets.
    pub fn claimed_total(&self) -> Money {
        if let Some(total) = &self.total {
            return total.clone();
        }
        let value = self
            .item
            .iter()
            .filter_map(|item| item.net.as_ref().map(|m| m.value))
            .sum();
        Money::inr(value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponseTotal {
    pub category: CodeableConcept,
    pub amount: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    #[serde(default)]
    pub status: FinancialStatus,
    #[serde(rename = "type", default)]
    pub claim_type: CodeableConcept,
    #[serde(rename = "use", default)]
    pub claim_use: ClaimUse,
    #[serde(default)]
    pub patient: Reference,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub insurer: Reference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requestor: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Reference>,
    #[serde(default)]
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_auth_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub total: Vec<ClaimResponseTotal>,
}

impl Resource for ClaimResponse {
    const RESOURCE_TYPE: &'static str = "ClaimResponse";
}
