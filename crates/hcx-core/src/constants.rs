//! Constants used throughout the HCX core crate.
//!
//! Defaults for every setting that [`crate::config`] reads, so the runner, the REST server
//! and the CLI agree on them.

/// Rows sampled from each worksheet when describing a workbook to the model.
pub const DEFAULT_SAMPLE_ROWS: usize = 5;

/// Upper bound on extracted document text embedded in the prompt.
pub const DEFAULT_MAX_SOURCE_CHARS: usize = 120_000;

/// Timeout applied to LLM generation calls, in seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

/// Timeout applied to gateway and FHIR utility calls, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Sampling temperature for generation calls.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_VERTEX_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_VERTEX_LOCATION: &str = "asia-south1";

/// Where the provider stub sends requests when nothing is configured: the local payer stub.
pub const DEFAULT_PROVIDER_OUTBOUND_URL: &str = "http://localhost:4001/hcx/v1";

/// Where the payer stub sends responses when nothing is configured: the local provider stub.
pub const DEFAULT_PAYER_OUTBOUND_URL: &str = "http://localhost:4002/hcx/v1";

pub const DEFAULT_PROVIDER_CODE: &str = "hcx-provider-stub";
pub const DEFAULT_PAYER_CODE: &str = "hcx-payer-stub";

/// Canned reply the provider stub sends to payer communication requests.
pub const DEFAULT_COMMUNICATION_REPLY: &str =
    "Requested information has been attached. Please proceed with adjudication.";

/// Listen addresses used by `hcx-run` when `HCX_*_ADDR` is unset.
pub const DEFAULT_CONVERTER_ADDR: &str = "0.0.0.0:4000";
pub const DEFAULT_PAYER_ADDR: &str = "0.0.0.0:4001";
pub const DEFAULT_PROVIDER_ADDR: &str = "0.0.0.0:4002";

/// Listen address of the single-process `hcx-api-rest` server.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
