use api_shared::{HealthRes, HealthService};
use axum::{extract::State, response::Json};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Served by the converter, payer and provider services alike; `service` names which one
/// answered.
///
/// # Returns
/// * `Json<HealthRes>` - Health status response containing service status
pub async fn health(State(health): State<HealthService>) -> Json<HealthRes> {
    Json(health.check())
}
