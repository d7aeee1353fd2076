//! # API Shared
//!
//! Shared request and response definitions for the HCX toolkit APIs.
//!
//! Contains:
//! - request forms the payer and provider stubs build FHIR templates from (`forms`)
//! - JSON response bodies (`responses`)
//! - the shared `HealthService`
//!
//! Every type derives `utoipa::ToSchema` so `api-rest` can publish it in the OpenAPI
//! document.

pub mod forms;
pub mod health;
pub mod responses;

pub use forms::{
    ClaimForm, ClaimLine, CommunicationAnswer, CommunicationForm, CommunicationReply,
    EligibilityForm, PatientDetails,
};
pub use health::HealthService;
pub use responses::{
    AckRes, ConvertRes, ErrorRes, ForwardRes, HealthRes, TimestampRes, ValidateRes,
};
