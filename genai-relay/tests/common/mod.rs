#![allow(dead_code)]

use genai_relay::config::{GeminiSettings, RelayConfig, UploadConfig, DEFAULT_MAX_UPLOAD_BYTES};
use genai_relay::services::providers::mock::MockTextProvider;
use genai_relay::startup::Application;
use service_core::config::Config as CoreConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Config for a relay bound to a random port, with staging and static
/// directories under a fresh scratch root.
pub fn test_config(root: &Path) -> RelayConfig {
    RelayConfig {
        common: CoreConfig { port: 0 },
        gemini: GeminiSettings {
            api_key: "test-api-key".to_string(),
            model: "gemini-2.0-flash".to_string(),
            temperature: Some(0.5),
            // Nothing listens here; tests that need Gemini override it.
            api_base: "http://127.0.0.1:9/v1beta".to_string(),
        },
        uploads: UploadConfig {
            dir: root.join("uploads").to_string_lossy().into_owned(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        },
        static_dir: root.join("public").to_string_lossy().into_owned(),
    }
}

pub fn scratch_root() -> PathBuf {
    PathBuf::from(format!("target/test-relay-{}", Uuid::new_v4()))
}

pub struct TestApp {
    pub address: String,
    pub staging_dir: PathBuf,
    pub root: PathBuf,
    pub provider: Arc<MockTextProvider>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(provider: MockTextProvider) -> Self {
        Self::spawn_with(provider, |_| {}).await
    }

    pub async fn spawn_with(provider: MockTextProvider, customize: impl FnOnce(&mut RelayConfig)) -> Self {
        let root = scratch_root();
        let mut config = test_config(&root);
        customize(&mut config);

        let provider = Arc::new(provider);
        let app = Application::build_with_provider(config, provider.clone())
            .await
            .expect("Failed to build test application");

        let address = format!("http://127.0.0.1:{}", app.port());
        let staging_dir = app.staging_dir().to_path_buf();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        wait_until_healthy(&client, &address).await;

        TestApp {
            address,
            staging_dir,
            root,
            provider,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Files currently sitting in the staging directory.
    pub fn staged_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.staging_dir)
            .expect("Failed to read staging directory")
            .map(|entry| entry.expect("Failed to read staging entry").path())
            .collect()
    }

    pub async fn cleanup(self) {
        let _ = tokio::fs::remove_dir_all(&self.root).await;
    }
}

pub async fn wait_until_healthy(client: &reqwest::Client, address: &str) {
    let health_url = format!("{}/health", address);
    for _ in 0..50 {
        if client.get(&health_url).send().await.is_ok() {
            return;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }
}

/// A multipart form with a single file part and an optional prompt.
pub fn upload_form(
    field: &str,
    file_name: &str,
    mime_type: &str,
    bytes: Vec<u8>,
    prompt: Option<&str>,
) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(mime_type)
        .expect("Invalid MIME type");

    let form = reqwest::multipart::Form::new();
    let form = match prompt {
        Some(prompt) => form.text("prompt", prompt.to_string()),
        None => form,
    };
    form.part(field.to_string(), part)
}
