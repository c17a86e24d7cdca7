//! Scripted [`ModelClient`] for unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Barrier;

use crate::llm::{ModelClient, OutputSchema};

enum Step {
    Reply(serde_json::Value),
    Fail(String),
}

/// Answers by schema name and records every prompt it is sent.
#[derive(Default)]
pub(crate) struct ScriptedModel {
    steps: HashMap<&'static str, Step>,
    calls: Mutex<Vec<(&'static str, String)>>,
    barrier: Option<Arc<Barrier>>,
    transcript: Option<String>,
    image: Option<String>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, schema: &'static str, value: serde_json::Value) -> Self {
        self.steps.insert(schema, Step::Reply(value));
        self
    }

    pub fn fail(mut self, schema: &'static str, message: &str) -> Self {
        self.steps.insert(schema, Step::Fail(message.to_string()));
        self
    }

    /// Enrichment calls ("analysis", "parallels") wait on `barrier` before
    /// answering, so a test can prove they are in flight together.
    pub fn enrichment_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn transcript(mut self, text: &str) -> Self {
        self.transcript = Some(text.to_string());
        self
    }

    pub fn image(mut self, url: &str) -> Self {
        self.image = Some(url.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn prompts(&self, schema: &str) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|(name, _)| *name == schema)
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn generate(&self, prompt: &str, schema: &OutputSchema) -> Result<serde_json::Value> {
        self.calls.lock().push((schema.name, prompt.to_string()));

        if let Some(barrier) = &self.barrier {
            if matches!(schema.name, "analysis" | "parallels") {
                barrier.wait().await;
            }
        }

        match self.steps.get(schema.name) {
            Some(Step::Reply(value)) => Ok(value.clone()),
            Some(Step::Fail(message)) => anyhow::bail!("{message}"),
            None => anyhow::bail!("no scripted reply for '{}'", schema.name),
        }
    }

    async fn transcribe(&self, _audio: &[u8], _mime_type: &str) -> Result<String> {
        self.calls.lock().push(("transcribe", String::new()));
        match &self.transcript {
            Some(text) => Ok(text.clone()),
            None => anyhow::bail!("transcription unavailable"),
        }
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        self.calls.lock().push(("image", prompt.to_string()));
        match &self.image {
            Some(url) => Ok(url.clone()),
            None => anyhow::bail!("image generation unavailable"),
        }
    }
}
