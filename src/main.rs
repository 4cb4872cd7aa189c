use issue_analysis_service::config::ServiceConfig;
use issue_analysis_service::observability::init_tracing;
use issue_analysis_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_tracing("issue-analysis-service", "info");

    // Load configuration - fail fast if invalid
    let config = ServiceConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
