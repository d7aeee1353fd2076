use api_rest::{Services, converter_app, payer_app, provider_app};
use axum::Router;
use hcx_core::constants::{DEFAULT_CONVERTER_ADDR, DEFAULT_PAYER_ADDR, DEFAULT_PROVIDER_ADDR};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn addr_from_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

async fn serve(name: &'static str, addr: String, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("++ {name} listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Main entry point for the HCX toolkit
///
/// Starts the three services concurrently:
/// - converter API on port 4000 (configurable via HCX_CONVERTER_ADDR)
/// - payer stub on port 4001 (configurable via HCX_PAYER_ADDR)
/// - provider stub on port 4002 (configurable via HCX_PROVIDER_ADDR)
///
/// With the default outbound URLs the provider stub talks to the payer stub on 4001 and the
/// payer stub answers the provider stub on 4002, so a complete exchange runs locally.
///
/// # Environment Variables
/// - `HCX_CONVERTER_ADDR`, `HCX_PAYER_ADDR`, `HCX_PROVIDER_ADDR`: listen addresses
/// - `LLM_PROVIDER` and the provider's credentials: see `hcx_core::LlmConfig`
/// - `HCX_GATEWAY_URL`, `HCX_PROVIDER_CODE`, `HCX_PAYER_CODE`, `FHIR_UTILITY_URL`
///
/// # Returns
/// * `Ok(())` - If servers start and run successfully
/// * `Err(anyhow::Error)` - If configuration is malformed or a server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hcx_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("hcx_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let converter_addr = addr_from_env("HCX_CONVERTER_ADDR", DEFAULT_CONVERTER_ADDR);
    let payer_addr = addr_from_env("HCX_PAYER_ADDR", DEFAULT_PAYER_ADDR);
    let provider_addr = addr_from_env("HCX_PROVIDER_ADDR", DEFAULT_PROVIDER_ADDR);

    let services = Services::from_lookup(&|key: &str| std::env::var(key).ok())?;

    let (converter, payer, provider) = tokio::join!(
        serve("converter", converter_addr, converter_app(services.converter)),
        serve("payer", payer_addr, payer_app(services.payer)),
        serve("provider", provider_addr, provider_app(services.provider)),
    );
    converter?;
    payer?;
    provider?;

    Ok(())
}
