use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::{error_response, json_body};
use crate::models::{
    FactResponse, OriginMapRequest, OriginMapResponse, TranscribeRequest, TranscribeResponse,
};
use crate::state::AppState;

/// GET /api/fact - Always answers; `fallback` marks a stored fact.
pub async fn fact(State(state): State<AppState>) -> Json<FactResponse> {
    let fact = state.search.random_fact().await;
    Json(FactResponse {
        fact: fact.text,
        fallback: fact.fallback,
    })
}

/// POST /api/transcribe - Spoken query to text.
pub async fn transcribe(
    State(state): State<AppState>,
    payload: Result<Json<TranscribeRequest>, JsonRejection>,
) -> Result<Json<TranscribeResponse>, (StatusCode, String)> {
    let req = json_body(payload)?;
    let text = state
        .search
        .transcribe(&req.audio_data_uri, state.config.max_audio_bytes)
        .await
        .map_err(|e| error_response("Transcription", e))?;
    Ok(Json(TranscribeResponse { text }))
}

/// POST /api/origin-map - Illustrated map of where a tradition began.
pub async fn origin_map(
    State(state): State<AppState>,
    payload: Result<Json<OriginMapRequest>, JsonRejection>,
) -> Result<Json<OriginMapResponse>, (StatusCode, String)> {
    let req = json_body(payload)?;
    let image_url = state
        .search
        .origin_map(&req.tradition)
        .await
        .map_err(|e| error_response("Origin map", e))?;
    Ok(Json(OriginMapResponse { image_url }))
}

/// GET /api/health
pub async fn health() -> &'static str {
    "ok"
}
