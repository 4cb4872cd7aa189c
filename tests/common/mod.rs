use issue_analysis_service::config::ServiceConfig;
use issue_analysis_service::services::providers::VisionProvider;
use issue_analysis_service::startup::Application;
use reqwest::multipart;
use std::sync::Arc;
use std::time::Duration;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application on a random port with an injected provider.
    pub async fn spawn(provider: Arc<dyn VisionProvider>) -> Self {
        std::env::set_var("ENVIRONMENT", "test");
        std::env::set_var("GOOGLE_API_KEY", "test-api-key");

        let mut config = ServiceConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing

        let app = Application::build_with_provider(config, provider)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp { address, client }
    }

    /// Post a single-file multipart upload to the analysis endpoint.
    pub async fn post_image(&self, bytes: Vec<u8>, mime_type: &str) -> reqwest::Response {
        let form = multipart::Form::new().part(
            "file",
            multipart::Part::bytes(bytes)
                .file_name("upload.jpg")
                .mime_str(mime_type)
                .expect("Invalid mime type in test"),
        );

        self.client
            .post(format!("{}/api/analyze-issue/", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
