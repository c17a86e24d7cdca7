use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::config::LlmConfig;
use crate::llm::generate::{
    post_gemini, GeminiContent, GeminiGenerationConfig, GeminiInlineData, GeminiPart,
    GeminiRequest, GeminiResponse,
};

const TRANSCRIBE_INSTRUCTION: &str = "Transcribe the following audio. The user is speaking a \
     search query for a religious or philosophical topic. Reply with the transcript only.";

/// Speech-to-text for a spoken search query.
pub async fn transcribe_audio(
    client: &reqwest::Client,
    config: &LlmConfig,
    audio: &[u8],
    mime_type: &str,
) -> Result<String> {
    if audio.is_empty() {
        anyhow::bail!("No audio to transcribe");
    }

    let text = match config.provider.as_str() {
        "gemini" => transcribe_gemini(client, config, audio, mime_type).await?,
        "openai" => transcribe_openai(client, config, audio, mime_type).await?,
        "ollama" => anyhow::bail!("Ollama does not support audio transcription"),
        other => anyhow::bail!("Unknown LLM provider: {other}"),
    };

    Ok(text.trim().to_string())
}

/// File extension the transcription endpoints expect for a MIME type.
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "audio/wav" => "wav",
        "audio/webm" => "webm",
        "audio/ogg" => "ogg",
        "audio/mpeg" => "mp3",
        "audio/mp4" => "m4a",
        "audio/flac" => "flac",
        _ => "bin",
    }
}

// ─── Gemini ──────────────────────────────────────────────

async fn transcribe_gemini(
    client: &reqwest::Client,
    config: &LlmConfig,
    audio: &[u8],
    mime_type: &str,
) -> Result<String> {
    let req = GeminiRequest {
        contents: vec![GeminiContent {
            role: Some("user".to_string()),
            parts: vec![
                GeminiPart {
                    text: Some(TRANSCRIBE_INSTRUCTION.to_string()),
                    inline_data: None,
                },
                GeminiPart {
                    text: None,
                    inline_data: Some(GeminiInlineData {
                        mime_type: mime_type.to_string(),
                        data: STANDARD.encode(audio),
                    }),
                },
            ],
        }],
        generation_config: Some(GeminiGenerationConfig {
            temperature: 0.0,
            response_mime_type: None,
            response_schema: None,
        }),
    };

    let resp = post_gemini(client, config, &config.chat_model, "generateContent", &req).await?;
    let body: GeminiResponse = resp
        .json()
        .await
        .context("Failed to parse Gemini transcription response")?;

    body.text().context("Gemini returned an empty transcription")
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Deserialize)]
struct OpenAiTranscriptionResponse {
    text: String,
}

async fn transcribe_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    audio: &[u8],
    mime_type: &str,
) -> Result<String> {
    let url = format!("{}/v1/audio/transcriptions", config.base_url);
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let file = reqwest::multipart::Part::bytes(audio.to_vec())
        .file_name(format!("query.{}", extension_for(mime_type)))
        .mime_str(mime_type)
        .context("Invalid audio MIME type")?;
    let form = reqwest::multipart::Form::new()
        .text("model", config.transcription_model.clone())
        .text("prompt", TRANSCRIBE_INSTRUCTION)
        .part("file", file);

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .multipart(form)
        .send()
        .await
        .context("Failed to call OpenAI transcription API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("OpenAI transcription API returned {status}: {body}");
    }

    let body: OpenAiTranscriptionResponse = resp
        .json()
        .await
        .context("Failed to parse OpenAI transcription response")?;
    Ok(body.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_known_types() {
        assert_eq!(extension_for("audio/webm"), "webm");
        assert_eq!(extension_for("audio/mpeg"), "mp3");
        assert_eq!(extension_for("audio/wav"), "wav");
    }

    #[test]
    fn test_extension_for_unknown_type() {
        assert_eq!(extension_for("video/mp4"), "bin");
    }

    #[tokio::test]
    async fn test_empty_audio_rejected_before_any_request() {
        let client = reqwest::Client::new();
        let config = LlmConfig::default();
        let err = transcribe_audio(&client, &config, &[], "audio/wav")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No audio"));
    }

    #[tokio::test]
    async fn test_ollama_transcription_unsupported() {
        let client = reqwest::Client::new();
        let config = LlmConfig {
            provider: "ollama".into(),
            ..LlmConfig::default()
        };
        let err = transcribe_audio(&client, &config, b"RIFF", "audio/wav")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Ollama"));
    }
}
