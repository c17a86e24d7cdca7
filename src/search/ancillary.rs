//! Small model-backed features next to search: the random fact, the origin
//! map, and spoken queries.

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::error::{Result, WisdomError};
use crate::llm::{self, ModelClient};
use crate::search::catalog::FALLBACK_FACTS;
use crate::search::{prompt, schema};

/// Audio formats the transcription backends accept.
pub const SUPPORTED_AUDIO: [&str; 6] = [
    "audio/wav",
    "audio/webm",
    "audio/ogg",
    "audio/mpeg",
    "audio/mp4",
    "audio/flac",
];

#[derive(Debug, Deserialize)]
struct FactReply {
    fact: String,
}

/// A fact and whether it came from the stored list instead of the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub text: String,
    pub fallback: bool,
}

/// Ask the model for a fact; on any failure serve a stored one.
pub async fn random_fact(model: &dyn ModelClient) -> Fact {
    let reply: anyhow::Result<FactReply> =
        llm::invoke(model, prompt::fact_prompt(), &schema::fact()).await;

    match reply {
        Ok(reply) if !reply.fact.trim().is_empty() => Fact {
            text: reply.fact.trim().to_string(),
            fallback: false,
        },
        Ok(_) => {
            tracing::warn!("model returned an empty fact, using a stored one");
            stored_fact()
        }
        Err(e) => {
            tracing::warn!("fact generation failed, using a stored one: {e:#}");
            stored_fact()
        }
    }
}

fn stored_fact() -> Fact {
    let text = FALLBACK_FACTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_FACTS[0]);
    Fact {
        text: text.to_string(),
        fallback: true,
    }
}

/// Illustrated map of where `tradition` began, as an image URL.
pub async fn origin_map(model: &dyn ModelClient, tradition: &str) -> Result<String> {
    let tradition = tradition.trim();
    if tradition.is_empty() {
        return Err(WisdomError::InvalidInput("tradition is required".into()));
    }
    let rendered = prompt::origin_map_prompt(tradition)?;
    let url = model
        .generate_image(&rendered)
        .await
        .with_context(|| format!("Origin map for {tradition} failed"))?;
    tracing::info!(tradition, "origin map generated");
    Ok(url)
}

/// Decoded audio from a `data:<mime>;base64,<payload>` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Parse and check a recorded clip. MIME parameters such as `;codecs=opus`
/// are dropped and aliases are mapped to their canonical names.
pub fn parse_audio_data_uri(uri: &str, max_bytes: usize) -> Result<AudioClip> {
    let invalid = |msg: &str| WisdomError::InvalidInput(msg.to_string());

    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| invalid("audio must be a data: URI"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("audio data URI has no payload"))?;

    let mut parts = header.split(';').map(str::trim);
    let mime_type = normalize_mime(parts.next().unwrap_or_default());
    if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(invalid("audio data URI must be base64 encoded"));
    }
    if !SUPPORTED_AUDIO.contains(&mime_type.as_str()) {
        return Err(WisdomError::InvalidInput(format!(
            "unsupported audio type: {mime_type}"
        )));
    }

    // base64 inflates by 4/3; refuse oversized payloads before decoding
    if payload.len() / 4 * 3 > max_bytes + 3 {
        return Err(invalid("audio clip is too large"));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| WisdomError::InvalidInput(format!("audio is not valid base64: {e}")))?;
    if bytes.is_empty() {
        return Err(invalid("audio clip is empty"));
    }
    if bytes.len() > max_bytes {
        return Err(invalid("audio clip is too large"));
    }

    Ok(AudioClip { mime_type, bytes })
}

fn normalize_mime(raw: &str) -> String {
    let mime = raw.trim().to_ascii_lowercase();
    match mime.as_str() {
        "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => "audio/wav".to_string(),
        "audio/mp3" => "audio/mpeg".to_string(),
        "audio/x-m4a" | "audio/m4a" => "audio/mp4".to_string(),
        "audio/x-flac" => "audio/flac".to_string(),
        _ => mime,
    }
}

/// Transcribe a recorded clip into a search query.
pub async fn transcribe(model: &dyn ModelClient, data_uri: &str, max_bytes: usize) -> Result<String> {
    let clip = parse_audio_data_uri(data_uri, max_bytes)?;
    let text = model
        .transcribe(&clip.bytes, &clip.mime_type)
        .await
        .context("Transcription failed")?;
    tracing::info!(mime = %clip.mime_type, bytes = clip.bytes.len(), chars = text.chars().count(), "audio transcribed");
    Ok(text.trim().to_string())
}
