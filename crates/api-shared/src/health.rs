use crate::HealthRes;

/// Health check shared by the converter, payer and provider services
///
/// Each service reports its own name so a caller probing several ports can tell them apart.
#[derive(Clone, Debug)]
pub struct HealthService {
    service: &'static str,
}

impl HealthService {
    /// Creates a health service reporting for `service`.
    pub fn new(service: &'static str) -> Self {
        Self { service }
    }

    pub fn check(&self) -> HealthRes {
        HealthRes {
            ok: true,
            service: self.service.into(),
            message: format!("{} is alive", self.service),
        }
    }
}
