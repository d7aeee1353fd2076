//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the converter API and both HCX stubs on a single listener.
//!
//! ## Intended use
//! Useful for development and demos when one port is easier than three. Point
//! `HCX_PROVIDER_OUTBOUND_URL` and `HCX_PAYER_OUTBOUND_URL` at this server's `/hcx/v1` to let
//! it talk to itself. The workspace's main `hcx-run` binary serves the three services on
//! separate addresses.

use api_rest::{combined_app, Services};
use hcx_core::constants::DEFAULT_REST_ADDR;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the HCX REST API server
///
/// # Environment Variables
/// - `HCX_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - everything `hcx_core::CoreConfig` and `hcx_core::LlmConfig` read
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is malformed,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("hcx_core=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("HCX_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
    let services = Services::from_lookup(&|key: &str| std::env::var(key).ok())?;

    tracing::info!("-- Starting HCX REST API on {}", addr);

    let app = combined_app(services.converter, services.payer, services.provider);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
