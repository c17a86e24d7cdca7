use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::json_body;
use crate::config::{default_base_url, LlmConfig, PROVIDERS};
use crate::models::{LlmConfigResponse, LlmConfigUpdate};
use crate::state::AppState;

/// GET /api/config - Current LLM config (API key redacted)
pub async fn get_config(State(state): State<AppState>) -> Json<LlmConfigResponse> {
    Json(redacted(&state.llm_config.read()))
}

/// PUT /api/config - Update LLM config
pub async fn update_config(
    State(state): State<AppState>,
    payload: Result<Json<LlmConfigUpdate>, JsonRejection>,
) -> Result<Json<LlmConfigResponse>, (StatusCode, String)> {
    let update = json_body(payload)?;
    let provider = match update.provider {
        Some(p) => {
            let p = p.trim().to_lowercase();
            if !PROVIDERS.contains(&p.as_str()) {
                return Err((
                    StatusCode::BAD_REQUEST,
                    format!("Unknown provider '{p}' (expected one of: {})", PROVIDERS.join(", ")),
                ));
            }
            Some(p)
        }
        None => None,
    };
    if let Some(t) = update.temperature {
        if !(0.0..=2.0).contains(&t) {
            return Err((
                StatusCode::BAD_REQUEST,
                "Temperature must be between 0 and 2".to_string(),
            ));
        }
    }

    let mut config = state.llm_config.write();

    if let Some(provider) = provider {
        // base_url is immutable at runtime apart from the fixed per-provider
        // defaults; an arbitrary URL could exfiltrate the API key
        if provider != config.provider {
            config.base_url = default_base_url(&provider).to_string();
        }
        config.provider = provider;
    }
    if let Some(chat_model) = update.chat_model {
        config.chat_model = chat_model;
    }
    if let Some(image_model) = update.image_model {
        config.image_model = image_model;
    }
    if let Some(transcription_model) = update.transcription_model {
        config.transcription_model = transcription_model;
    }
    if let Some(api_key) = update.api_key {
        config.api_key = Some(api_key).filter(|k| !k.trim().is_empty());
    }
    if let Some(temperature) = update.temperature {
        config.temperature = temperature;
    }

    tracing::info!(provider = %config.provider, model = %config.chat_model, "LLM config updated");
    Ok(Json(redacted(&config)))
}

fn redacted(config: &LlmConfig) -> LlmConfigResponse {
    LlmConfigResponse {
        provider: config.provider.clone(),
        base_url: config.base_url.clone(),
        chat_model: config.chat_model.clone(),
        image_model: config.image_model.clone(),
        transcription_model: config.transcription_model.clone(),
        temperature: config.temperature,
        has_api_key: config.api_key.is_some(),
    }
}
