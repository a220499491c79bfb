use service_core::observability::init_tracing;
use tax_assistant_service::config::TaxAssistantConfig;
use tax_assistant_service::startup::Application;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing; spans are exported only when an OTLP endpoint is set
    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("tax-assistant-service", "info", otlp_endpoint.as_deref())?;

    let config = TaxAssistantConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    tracing::info!(
        port = config.common.port,
        model = %config.gemini.model,
        api_key_configured = config.has_api_key(),
        "Starting tax-assistant-service"
    );

    let app = Application::build(config).await?;
    app.run_until_stopped().await?;

    Ok(())
}
