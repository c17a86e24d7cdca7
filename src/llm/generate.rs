use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::llm::{extract_json, OutputSchema};

/// Run a prompt through the configured provider and return the parsed JSON
/// reply. Each provider gets the schema in whatever form it enforces best.
pub async fn generate_structured(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
    schema: &OutputSchema,
) -> Result<serde_json::Value> {
    let content = match config.provider.as_str() {
        "gemini" => call_gemini(client, config, prompt, schema).await?,
        "ollama" => call_ollama(client, config, prompt, schema).await?,
        "openai" => call_openai(client, config, prompt, schema).await?,
        other => anyhow::bail!("Unknown LLM provider: {other}"),
    };

    extract_json(&content)
}

// ─── Gemini ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<GeminiInlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiInlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiGenerationConfig {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Deserialize)]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate.
    pub(crate) fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

pub(crate) async fn post_gemini(
    client: &reqwest::Client,
    config: &LlmConfig,
    model: &str,
    method: &str,
    body: &impl Serialize,
) -> Result<reqwest::Response> {
    let url = format!("{}/v1beta/models/{model}:{method}", config.base_url);
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let resp = client
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(body)
        .send()
        .await
        .with_context(|| format!("Failed to call Gemini {method} API"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Gemini {method} API returned {status}: {body}");
    }

    Ok(resp)
}

async fn call_gemini(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
    schema: &OutputSchema,
) -> Result<String> {
    let req = GeminiRequest {
        contents: vec![GeminiContent {
            role: Some("user".to_string()),
            parts: vec![GeminiPart {
                text: Some(prompt.to_string()),
                inline_data: None,
            }],
        }],
        generation_config: Some(GeminiGenerationConfig {
            temperature: config.temperature,
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(to_gemini_schema(&schema.schema)),
        }),
    };

    let resp = post_gemini(client, config, &config.chat_model, "generateContent", &req).await?;
    let body: GeminiResponse = resp
        .json()
        .await
        .context("Failed to parse Gemini generateContent response")?;

    body.text()
        .context("Gemini returned no candidates (prompt may have been blocked)")
}

/// Gemini's response schema is an OpenAPI subset with upper-case type names.
fn to_gemini_schema(schema: &serde_json::Value) -> serde_json::Value {
    match schema {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| {
                let v = match (k.as_str(), v) {
                    ("type", serde_json::Value::String(t)) => {
                        serde_json::Value::String(t.to_uppercase())
                    }
                    _ => to_gemini_schema(v),
                };
                (k.clone(), v)
            })
            .collect(),
        serde_json::Value::Array(items) => items.iter().map(to_gemini_schema).collect(),
        other => other.clone(),
    }
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    format: serde_json::Value,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Message,
}

async fn call_ollama(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
    schema: &OutputSchema,
) -> Result<String> {
    let url = format!("{}/api/chat", config.base_url);

    let req = OllamaChatRequest {
        model: config.chat_model.clone(),
        messages: vec![Message {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        stream: false,
        format: schema.schema.clone(),
        options: OllamaOptions {
            temperature: config.temperature,
        },
    };

    let resp = client
        .post(&url)
        .json(&req)
        .send()
        .await
        .context("Failed to call Ollama chat API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Ollama chat API returned {status}: {body}");
    }

    let body: OllamaChatResponse = resp
        .json()
        .await
        .context("Failed to parse Ollama chat response")?;
    Ok(body.message.content)
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    response_format: OpenAiResponseFormat,
}

#[derive(Serialize)]
struct OpenAiResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

fn schema_instruction(schema: &OutputSchema) -> String {
    format!(
        "Respond with ONLY a JSON object that conforms to this JSON Schema. \
         Use null where the schema allows it and the answer is unknown.\n{}",
        schema.schema
    )
}

async fn call_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
    schema: &OutputSchema,
) -> Result<String> {
    let url = format!("{}/v1/chat/completions", config.base_url);
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiChatRequest {
        model: config.chat_model.clone(),
        messages: vec![
            Message {
                role: "system".to_string(),
                content: schema_instruction(schema),
            },
            Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            },
        ],
        temperature: config.temperature,
        response_format: OpenAiResponseFormat {
            kind: "json_object",
        },
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await
        .context("Failed to call OpenAI chat API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("OpenAI chat API returned {status}: {body}");
    }

    let body: OpenAiChatResponse = resp
        .json()
        .await
        .context("Failed to parse OpenAI chat response")?;
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("OpenAI returned an empty completion")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gemini_schema_uppercases_nested_types() {
        let schema = json!({
            "type": "object",
            "properties": {
                "verse": {
                    "type": "object",
                    "nullable": true,
                    "properties": {"text": {"type": "string"}}
                },
                "parallels": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["verse"]
        });
        let converted = to_gemini_schema(&schema);
        assert_eq!(converted["type"], "OBJECT");
        assert_eq!(converted["properties"]["verse"]["type"], "OBJECT");
        assert_eq!(converted["properties"]["verse"]["nullable"], true);
        assert_eq!(
            converted["properties"]["verse"]["properties"]["text"]["type"],
            "STRING"
        );
        assert_eq!(converted["properties"]["parallels"]["items"]["type"], "STRING");
        // property *names* are left alone, only `type` values change
        assert_eq!(converted["required"], json!(["verse"]));
    }

    #[test]
    fn test_gemini_property_named_type_is_not_rewritten() {
        let schema = json!({"properties": {"type": {"type": "string"}}});
        let converted = to_gemini_schema(&schema);
        assert_eq!(converted["properties"]["type"]["type"], "STRING");
    }

    #[test]
    fn test_gemini_response_text_joins_parts() {
        let body: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": [
                {"text": "{\"verse\":"}, {"text": " null}"}
            ]}}]
        }))
        .unwrap();
        assert_eq!(body.text().unwrap(), "{\"verse\": null}");
    }

    #[test]
    fn test_gemini_response_without_candidates() {
        let body: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        assert!(body.text().is_none());
    }

    #[test]
    fn test_openai_schema_instruction_embeds_schema() {
        let schema = OutputSchema {
            name: "fact",
            schema: json!({"type": "object", "properties": {"fact": {"type": "string"}}}),
        };
        let instruction = schema_instruction(&schema);
        assert!(instruction.contains("\"fact\""));
        assert!(instruction.starts_with("Respond with ONLY a JSON object"));
    }
}
