use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::config::LlmConfig;
use crate::llm::{generate, image, transcribe, ModelClient, OutputSchema};

/// [`ModelClient`] backed by a hosted LLM API over HTTP.
///
/// The provider settings are read on every call so `PUT /api/config` takes
/// effect without a restart.
#[derive(Clone)]
pub struct HttpModelClient {
    http: reqwest::Client,
    config: Arc<RwLock<LlmConfig>>,
}

impl HttpModelClient {
    pub fn new(config: Arc<RwLock<LlmConfig>>) -> Result<Self> {
        let timeout_secs = config.read().timeout_secs;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn snapshot(&self) -> LlmConfig {
        self.config.read().clone()
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn generate(&self, prompt: &str, schema: &OutputSchema) -> Result<serde_json::Value> {
        let config = self.snapshot();
        generate::generate_structured(&self.http, &config, prompt, schema).await
    }

    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String> {
        let config = self.snapshot();
        transcribe::transcribe_audio(&self.http, &config, audio, mime_type).await
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let config = self.snapshot();
        image::generate_image(&self.http, &config, prompt).await
    }
}
