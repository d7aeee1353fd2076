//! # HCX Core
//!
//! Business logic for the HCX integration toolkit:
//! - the insurance-plan converter (document in, FHIR `collection` bundle out)
//! - generation clients for OpenAI and Vertex AI behind one trait
//! - the payer and provider stubs and the HCX envelope they exchange
//! - the FHIR utility proxy
//!
//! **No API concerns**: HTTP servers, routing and response mapping belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod converter;
pub mod error;
pub mod fhir_utility;
pub mod hcx;
pub mod llm;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ConverterConfig, CoreConfig, HcxConfig, LlmConfig, LlmProvider};
pub use converter::{CheckedBundle, Conversion, InsurancePlanConverter};
pub use error::{ConfigError, ConverterError, HcxError};
pub use fhir_utility::FhirUtilityClient;
pub use hcx::{PayerStub, ProviderStub};
pub use llm::{client_from_config, GenerationClient, UnconfiguredClient};
