//! The model invocation capability.
//!
//! Everything "intelligent" in the service goes through [`ModelClient`]:
//! a rendered prompt plus an [`OutputSchema`] in, a JSON value out. The
//! search core only ever sees the trait, so tests swap in a scripted model
//! and production wires up [`client::HttpModelClient`].

pub mod client;
pub mod generate;
pub mod image;
pub mod transcribe;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Shape the model's structured reply must take.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    /// Short identifier, also used as the schema name for providers that want one
    pub name: &'static str,
    /// JSON Schema (lowercase types, `nullable` for optional objects)
    pub schema: serde_json::Value,
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate a JSON value conforming to `schema` for the given prompt.
    async fn generate(&self, prompt: &str, schema: &OutputSchema) -> Result<serde_json::Value>;

    /// Speech to text.
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String>;

    /// Returns a URL (usually a `data:` URI) for the generated image.
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}

/// Call the model and deserialize its reply into `T`.
///
/// A reply that does not fit the schema is an error, never a silent default.
pub async fn invoke<T: DeserializeOwned>(
    model: &dyn ModelClient,
    prompt: &str,
    schema: &OutputSchema,
) -> Result<T> {
    tracing::debug!(schema = schema.name, prompt_len = prompt.len(), "invoking model");
    let value = model.generate(prompt, schema).await?;
    serde_json::from_value(value)
        .with_context(|| format!("Model output does not match the '{}' schema", schema.name))
}

/// Serde helper for fields the model must always send but may set to null.
/// Unlike a plain `Option`, a missing key is a deserialization error.
pub fn required_nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// Pull the JSON object out of a model reply. Handles bare JSON, JSON inside
/// markdown fences, and JSON with chatter around it.
pub fn extract_json(content: &str) -> Result<serde_json::Value> {
    let trimmed = content.trim();
    if let Ok(v) = serde_json::from_str(trimmed) {
        return Ok(v);
    }

    let json_str = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => anyhow::bail!("Model reply contains no JSON object: {}", preview(trimmed)),
    };

    serde_json::from_str(json_str)
        .with_context(|| format!("Malformed JSON in model reply: {}", preview(trimmed)))
}

fn preview(s: &str) -> String {
    const MAX: usize = 200;
    if s.len() <= MAX {
        return s.to_string();
    }
    let mut end = MAX;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
