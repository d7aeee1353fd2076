//! Start-up wiring shared by the `hcx-api-rest` and `hcx-run` binaries.

use crate::ConverterState;
use hcx_core::config::Lookup;
use hcx_core::{
    client_from_config, CoreConfig, FhirUtilityClient, GenerationClient, InsurancePlanConverter,
    LlmConfig, PayerStub, ProviderStub, UnconfiguredClient,
};
use std::sync::Arc;

/// Everything the routers need, resolved once from configuration.
#[derive(Clone)]
pub struct Services {
    pub converter: ConverterState,
    pub payer: PayerStub,
    pub provider: ProviderStub,
}

impl Services {
    /// Resolves configuration through `lookup` and builds every service.
    ///
    /// A missing or invalid LLM configuration is not fatal: the converter falls back to an
    /// [`UnconfiguredClient`] so the stubs and the validation endpoint still come up.
    ///
    /// # Errors
    /// Returns an error if:
    /// - a converter or HCX setting is malformed,
    /// - an HTTP client cannot be built.
    pub fn from_lookup(lookup: Lookup<'_>) -> anyhow::Result<Self> {
        let config = CoreConfig::from_lookup(lookup)?;

        let llm: Arc<dyn GenerationClient> = match LlmConfig::from_lookup(lookup) {
            Ok(llm_config) => client_from_config(&llm_config)?,
            Err(e) => {
                tracing::warn!("LLM disabled, conversions will fail: {e}");
                Arc::new(UnconfiguredClient::new(e.to_string()))
            }
        };

        Self::new(config, llm)
    }

    pub fn new(config: CoreConfig, llm: Arc<dyn GenerationClient>) -> anyhow::Result<Self> {
        let hcx = Arc::new(config.hcx);

        let fhir_utility = FhirUtilityClient::from_config(&hcx)?;
        match &fhir_utility {
            Some(client) => tracing::info!("FHIR utility proxy -> {}", client.base_url()),
            None => tracing::info!("FHIR_UTILITY_URL not set, proxy disabled"),
        }

        let converter = InsurancePlanConverter::new(Arc::new(config.converter), llm);

        Ok(Self {
            converter: ConverterState::new(converter, fhir_utility),
            payer: PayerStub::new(hcx.clone())?,
            provider: ProviderStub::new(hcx)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn starts_without_llm_credentials() {
        let lookup = lookup_from(&[("HCX_PAYER_CODE", "payer-9")]);
        let services = Services::from_lookup(&lookup).unwrap();

        assert_eq!(services.payer.participant_code(), "payer-9");
        assert!(services.converter.fhir_utility.is_none());
    }

    #[test]
    fn malformed_setting_is_fatal() {
        let lookup = lookup_from(&[("EXCEL_SAMPLE_ROWS", "0")]);
        assert!(Services::from_lookup(&lookup).is_err());
    }
}
