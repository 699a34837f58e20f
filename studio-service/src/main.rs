use service_core::observability::{init_metrics, init_tracing};
use studio_service::config::StudioConfig;
use studio_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("studio-service", "info", otlp_endpoint.as_deref());

    init_metrics();

    let config = StudioConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
