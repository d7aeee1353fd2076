//! The FHIR `Bundle` container.
//!
//! Entries hold raw JSON resources: the converter produces bundles from model output whose
//! shape is not known ahead of time, and the HCX stubs mix several resource types in one
//! bundle. Bundle and entry elements that are not modelled survive a round trip through
//! `extra`.

use crate::{resource_type_of, urn_uuid, FhirError, FhirResult, Meta, Resource};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
    History,
    Searchset,
    #[default]
    Collection,
    /// A code outside the R4 value set, kept as written.
    #[serde(untagged)]
    Other(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,
    #[serde(default)]
    pub resource: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BundleEntry {
    /// Entry with a freshly allocated `urn:uuid:` full URL.
    pub fn new(resource: Value) -> Self {
        Self {
            full_url: Some(urn_uuid(&Uuid::new_v4())),
            resource,
            extra: Map::new(),
        }
    }

    /// `resourceType` of the contained resource.
    pub fn resource_type(&self) -> Option<&str> {
        resource_type_of(&self.resource)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(rename = "type", default)]
    pub bundle_type: BundleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub entry: Vec<BundleEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Bundle {
    const RESOURCE_TYPE: &'static str = "Bundle";
}

impl Bundle {
    /// A `collection` bundle with one entry per resource.
    pub fn collection(resources: impl IntoIterator<Item = Value>) -> Self {
        Self {
            id: Some(Uuid::new_v4().to_string()),
            meta: None,
            bundle_type: BundleType::Collection,
            timestamp: Some(hcx_types::ist_timestamp()),
            entry: resources.into_iter().map(BundleEntry::new).collect(),
            extra: Map::new(),
        }
    }

    /// Appends a typed resource as a new entry and returns its `fullUrl`.
    pub fn push<R: Resource>(&mut self, resource: &R) -> FhirResult<String> {
        let entry = BundleEntry::new(resource.to_value()?);
        let full_url = entry.full_url.clone().unwrap_or_default();
        self.entry.push(entry);
        Ok(full_url)
    }

    /// Iterates over the contained resources.
    pub fn resources(&self) -> impl Iterator<Item = &Value> {
        self.entry.iter().map(|e| &e.resource)
    }

    /// First entry whose resource has the given type, deserialised.
    pub fn find<R: Resource>(&self) -> FhirResult<Option<R>> {
        self.resources()
            .find(|r| resource_type_of(r) == Some(R::RESOURCE_TYPE))
            .map(|r| R::from_value(r.clone()))
            .transpose()
    }

    /// Like [`Bundle::find`] but fails when the resource is absent.
    pub fn require<R: Resource>(&self) -> FhirResult<R> {
        self.find()?.ok_or_else(|| {
            FhirError::InvalidInput(format!("bundle contains no {} entry", R::RESOURCE_TYPE))
        })
    }
}
