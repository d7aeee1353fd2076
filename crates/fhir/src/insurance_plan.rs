//! InsurancePlan resource.
//!
//! Plans are produced by an external model, so only the identifying fields are typed. Every
//! other element is kept verbatim in `extra` and written back unchanged.

use crate::{CodeableConcept, Identifier, Meta, Period, Reference, Resource};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub plan_type: Vec<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<Reference>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for InsurancePlan {
    const RESOURCE_TYPE: &'static str = "InsurancePlan";
}

impl InsurancePlan {
    /// Number of `coverage` elements, whatever their shape.
    pub fn coverage_count(&self) -> usize {
        self.extra
            .get("coverage")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Number of `plan` elements, whatever their shape.
    pub fn plan_count(&self) -> usize {
        self.extra
            .get("plan")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_untyped_elements() {
        let input = json!({
            "resourceType": "InsurancePlan",
            "id": "gold-2024",
            "status": "active",
            "name": "Gold Health Cover",
            "coverage": [{"type": {"text": "Inpatient"}}, {"type": {"text": "Daycare"}}],
            "plan": [{"type": {"text": "Individual"}}]
        });

        let plan = InsurancePlan::from_value(input.clone()).unwrap();
        assert_eq!(plan.name.as_deref(), Some("Gold Health Cover"));
        assert_eq!(plan.coverage_count(), 2);
        assert_eq!(plan.plan_count(), 1);
        assert_eq!(plan.to_value().unwrap(), input);
    }

    #[test]
    fn resource_type_is_not_duplicated_into_extra() {
        let plan = InsurancePlan::from_value(json!({"resourceType": "InsurancePlan"})).unwrap();
        assert!(!plan.extra.contains_key("resourceType"));
    }
}
