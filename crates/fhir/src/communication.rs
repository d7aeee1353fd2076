//! Communication resource, used by payers to ask providers for more information and by
//! providers to answer.

use crate::{CodeableConcept, Identifier, Meta, Reference, Resource};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommunicationStatus {
    Preparation,
    InProgress,
    NotDone,
    OnHold,
    Stopped,
    #[default]
    Completed,
    EnteredInError,
    Unknown,
}

/// One payload element. Only string content is modelled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_string: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub based_on: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub in_response_to: Vec<Reference>,
    #[serde(default)]
    pub status: CommunicationStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub about: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipient: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payload: Vec<CommunicationPayload>,
}

impl Resource for Communication {
    const RESOURCE_TYPE: &'static str = "Communication";
}

impl Communication {
    /// All string payloads joined by newlines.
    pub fn text(&self) -> String {
        self.payload
            .iter()
            .filter_map(|p| p.content_string.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
