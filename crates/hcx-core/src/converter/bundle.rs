//! Turning parsed model output into a validated `collection` bundle.

use crate::error::{ConverterError, ConverterResult};
use fhir::{resource_type_of, Bundle, InsurancePlan, Resource};
use serde_json::{json, Value};

/// A bundle built from model output plus the array elements that were dropped because they
/// carried an `error` key.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalised {
    pub bundle: Bundle,
    pub dropped: Vec<String>,
}

fn error_message(item: &Value) -> String {
    match item.get("error") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => item.to_string(),
    }
}

/// Normalises parsed model output into a bundle.
///
/// - `Bundle` objects pass through
/// - a single `InsurancePlan` is wrapped in a one-entry bundle
/// - arrays lose their `error` elements and the rest is wrapped; an array made only of
///   errors fails with [`ConverterError::AllEntriesFailed`]
/// - anything else fails with [`ConverterError::UnexpectedOutput`]
pub fn normalise(value: Value) -> ConverterResult<Normalised> {
    match value {
        Value::Array(items) => {
            let (failed, resources): (Vec<Value>, Vec<Value>) =
                items.into_iter().partition(|item| item.get("error").is_some());
            let dropped: Vec<String> = failed.iter().map(error_message).collect();

            if resources.is_empty() {
                if dropped.is_empty() {
                    return Err(ConverterError::UnexpectedOutput);
                }
                return Err(ConverterError::AllEntriesFailed(dropped));
            }

            Ok(Normalised {
                bundle: Bundle::collection(resources),
                dropped,
            })
        }
        Value::Object(_) => match resource_type_of(&value) {
            Some("Bundle") => Ok(Normalised {
                bundle: Bundle::from_value(value)?,
                dropped: Vec::new(),
            }),
            Some("InsurancePlan") => Ok(Normalised {
                bundle: Bundle::collection([value]),
                dropped: Vec::new(),
            }),
            _ => Err(ConverterError::UnexpectedOutput),
        },
        _ => Err(ConverterError::UnexpectedOutput),
    }
}

/// Appends `profile` to the resource's `meta.profile` unless already present.
fn append_profile(resource: &mut Value, profile: &str) {
    let Some(object) = resource.as_object_mut() else {
        return;
    };
    let meta = object.entry("meta").or_insert_with(|| json!({}));
    if !meta.is_object() {
        *meta = json!({});
    }
    let profiles = meta
        .as_object_mut()
        .map(|m| m.entry("profile").or_insert_with(|| json!([])));
    if let Some(profiles) = profiles {
        if !profiles.is_array() {
            *profiles = json!([]);
        }
        if let Some(list) = profiles.as_array_mut() {
            if !list.iter().any(|p| p.as_str() == Some(profile)) {
                list.push(Value::String(profile.to_string()));
            }
        }
    }
}

/// Checks that every entry is an `InsurancePlan` and tags plans with `profile_url`.
///
/// Returns one message per offending entry; an empty bundle is reported too.
pub fn validate(bundle: &mut Bundle, profile_url: Option<&str>) -> Vec<String> {
    let mut errors = Vec::new();

    if bundle.entry.is_empty() {
        errors.push("Bundle contains no entries".to_string());
    }

    for (index, entry) in bundle.entry.iter_mut().enumerate() {
        match entry.resource_type() {
            Some(InsurancePlan::RESOURCE_TYPE) => {
                if let Some(profile) = profile_url {
                    append_profile(&mut entry.resource, profile);
                }
            }
            other => errors.push(format!(
                "Entry {index}: expected resourceType InsurancePlan, found {}",
                other.unwrap_or("none")
            )),
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::BundleType;

    const PROFILE: &str = "https://ig.hcxprotocol.io/v0.7.1/StructureDefinition-InsurancePlan.html";

    #[test]
    fn single_plan_is_wrapped_in_collection() {
        let out = normalise(json!({"resourceType": "InsurancePlan", "name": "Gold"})).unwrap();
        assert_eq!(out.bundle.bundle_type, BundleType::Collection);
        assert_eq!(out.bundle.entry.len(), 1);
        assert_eq!(out.bundle.entry[0].resource["name"], "Gold");
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn bundle_passes_through() {
        let out = normalise(json!({
            "resourceType": "Bundle",
            "id": "from-model",
            "type": "collection",
            "entry": [{"fullUrl": "urn:uuid:1", "resource": {"resourceType": "InsurancePlan"}}]
        }))
        .unwrap();
        assert_eq!(out.bundle.id.as_deref(), Some("from-model"));
        assert_eq!(out.bundle.entry[0].full_url.as_deref(), Some("urn:uuid:1"));
    }

    #[test]
    fn bundle_keeps_unmodelled_elements() {
        let model_bundle = json!({
            "resourceType": "Bundle",
            "meta": {"versionId": "1", "source": "llm"},
            "identifier": {"system": "urn:plans", "value": "batch-7"},
            "type": "collection",
            "total": 1,
            "link": [{"relation": "self", "url": "https://example.org/plans"}],
            "entry": [{
                "fullUrl": "urn:uuid:1",
                "search": {"mode": "match", "score": 1},
                "resource": {"resourceType": "InsurancePlan", "name": "Gold"}
            }]
        });

        let out = normalise(model_bundle.clone()).unwrap();
        assert_eq!(out.bundle.to_value().unwrap(), model_bundle);
    }

    #[test]
    fn bundle_with_unexpected_type_code_is_not_an_error() {
        let out = normalise(json!({
            "resourceType": "Bundle",
            "type": "Collection",
            "entry": [{"resource": {"resourceType": "InsurancePlan"}}]
        }))
        .unwrap();
        assert_eq!(out.bundle.to_value().unwrap()["type"], "Collection");
        assert_eq!(out.bundle.entry.len(), 1);
    }

    #[test]
    fn array_drops_error_elements() {
        let out = normalise(json!([
            {"resourceType": "InsurancePlan", "name": "Gold"},
            {"error": "Sheet2 row 4 has no plan name"},
            {"resourceType": "InsurancePlan", "name": "Silver"}
        ]))
        .unwrap();
        assert_eq!(out.bundle.entry.len(), 2);
        assert_eq!(out.dropped, vec!["Sheet2 row 4 has no plan name".to_string()]);
    }

    #[test]
    fn array_of_only_errors_lists_every_error() {
        let err = normalise(json!([
            {"error": "no plan name"},
            {"error": {"code": "E42", "detail": "unreadable"}}
        ]))
        .unwrap_err();
        match err {
            ConverterError::AllEntriesFailed(errors) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0], "no plan name");
                assert!(errors[1].contains("E42"));
            }
            other => panic!("expected AllEntriesFailed, got {other:?}"),
        }
    }

    #[test]
    fn other_shapes_are_unexpected() {
        for value in [
            json!({"resourceType": "Patient"}),
            json!({"plans": []}),
            json!("InsurancePlan"),
            json!(42),
            json!([]),
        ] {
            assert!(
                matches!(normalise(value.clone()), Err(ConverterError::UnexpectedOutput)),
                "{value}"
            );
        }
    }

    #[test]
    fn validate_flags_non_insurance_plan_entries() {
        let mut bundle = Bundle::collection([
            json!({"resourceType": "InsurancePlan"}),
            json!({"resourceType": "Organization"}),
            json!({"name": "no type"}),
        ]);
        let errors = validate(&mut bundle, None);
        assert_eq!(
            errors,
            vec![
                "Entry 1: expected resourceType InsurancePlan, found Organization".to_string(),
                "Entry 2: expected resourceType InsurancePlan, found none".to_string(),
            ]
        );
    }

    #[test]
    fn validate_reports_empty_bundle() {
        let mut bundle = Bundle::collection(Vec::new());
        assert_eq!(validate(&mut bundle, None), vec!["Bundle contains no entries"]);
    }

    #[test]
    fn profile_is_appended_once() {
        let mut bundle = Bundle::collection([
            json!({"resourceType": "InsurancePlan"}),
            json!({"resourceType": "InsurancePlan", "meta": {"profile": [PROFILE]}}),
            json!({"resourceType": "InsurancePlan", "meta": {"versionId": "1", "profile": ["urn:other"]}}),
        ]);
        assert!(validate(&mut bundle, Some(PROFILE)).is_empty());

        assert_eq!(bundle.entry[0].resource["meta"]["profile"], json!([PROFILE]));
        assert_eq!(bundle.entry[1].resource["meta"]["profile"], json!([PROFILE]));
        assert_eq!(
            bundle.entry[2].resource["meta"]["profile"],
            json!(["urn:other", PROFILE])
        );
        assert_eq!(bundle.entry[2].resource["meta"]["versionId"], "1");
    }
}
