use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::llm::generate::post_gemini;

/// Generate one illustration and return it as a URL (a `data:` URI for
/// providers that answer with raw bytes).
pub async fn generate_image(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
) -> Result<String> {
    match config.provider.as_str() {
        "gemini" => generate_imagen(client, config, prompt).await,
        "openai" => generate_openai(client, config, prompt).await,
        "ollama" => anyhow::bail!("Ollama does not support image generation"),
        other => anyhow::bail!("Unknown LLM provider: {other}"),
    }
}

fn data_uri(mime_type: &str, b64: &str) -> String {
    format!("data:{mime_type};base64,{b64}")
}

// ─── Gemini (Imagen) ─────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagenRequest {
    instances: Vec<ImagenInstance>,
    parameters: ImagenParameters,
}

#[derive(Serialize)]
struct ImagenInstance {
    prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagenParameters {
    sample_count: u32,
}

#[derive(Deserialize)]
struct ImagenResponse {
    #[serde(default)]
    predictions: Vec<ImagenPrediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImagenPrediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

async fn generate_imagen(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
) -> Result<String> {
    let req = ImagenRequest {
        instances: vec![ImagenInstance {
            prompt: prompt.to_string(),
        }],
        parameters: ImagenParameters { sample_count: 1 },
    };

    let resp = post_gemini(client, config, &config.image_model, "predict", &req).await?;
    let body: ImagenResponse = resp
        .json()
        .await
        .context("Failed to parse Imagen response")?;

    let prediction = body
        .predictions
        .into_iter()
        .next()
        .context("Image generation returned no image")?;
    let bytes = prediction
        .bytes_base64_encoded
        .context("Image generation failed to return image data")?;
    let mime = prediction.mime_type.as_deref().unwrap_or("image/png");
    Ok(data_uri(mime, &bytes))
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiImageRequest {
    model: String,
    prompt: String,
    n: u32,
    size: &'static str,
    response_format: &'static str,
}

#[derive(Deserialize)]
struct OpenAiImageResponse {
    data: Vec<OpenAiImageData>,
}

#[derive(Deserialize)]
struct OpenAiImageData {
    b64_json: Option<String>,
    url: Option<String>,
}

async fn generate_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
) -> Result<String> {
    let url = format!("{}/v1/images/generations", config.base_url);
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiImageRequest {
        model: config.image_model.clone(),
        prompt: prompt.to_string(),
        n: 1,
        size: "1024x1024",
        response_format: "b64_json",
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await
        .context("Failed to call OpenAI image API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("OpenAI image API returned {status}: {body}");
    }

    let body: OpenAiImageResponse = resp
        .json()
        .await
        .context("Failed to parse OpenAI image response")?;
    let image = body
        .data
        .into_iter()
        .next()
        .context("Image generation returned no image")?;

    match (image.b64_json, image.url) {
        (Some(b64), _) => Ok(data_uri("image/png", &b64)),
        (None, Some(url)) => Ok(url),
        (None, None) => anyhow::bail!("Image generation failed to return a URL"),
    }
}
