//! Axum HTTP handlers.

pub mod config;
pub mod extras;
pub mod search;

use axum::extract::rejection::JsonRejection;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::OwnedSemaphorePermit;

use crate::error::WisdomError;
use crate::state::AppState;

/// Room for the JSON envelope and the `data:` header around the payload.
const TRANSCRIBE_BODY_OVERHEAD: usize = 64 * 1024;

/// Every route the service exposes.
pub fn router(state: AppState) -> Router {
    let transcribe_limit = transcribe_body_limit(state.config.max_audio_bytes);

    Router::new()
        .route("/api/search", post(search::search))
        .route("/api/parallels", post(search::parallels))
        .route("/api/themes", get(search::list_themes))
        .route("/api/themes/search", post(search::search_theme))
        .route("/api/sources", get(search::list_sources))
        .route("/api/fact", get(extras::fact))
        .route(
            "/api/transcribe",
            post(extras::transcribe).layer(DefaultBodyLimit::max(transcribe_limit)),
        )
        .route("/api/origin-map", post(extras::origin_map))
        .route("/api/config", get(config::get_config).put(config::update_config))
        .route("/api/health", get(extras::health))
        .with_state(state)
}

/// Largest request body that can carry a clip of `max_audio_bytes` once
/// base64 encoded.
pub fn transcribe_body_limit(max_audio_bytes: usize) -> usize {
    max_audio_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(TRANSCRIBE_BODY_OVERHEAD)
}

/// Unwrap a JSON body. Bad syntax and missing or mistyped fields are a
/// 400; an oversized body keeps its 413.
pub(crate) fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, (StatusCode, String)> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!("rejected request body: {}", rejection.body_text());
            let status = match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            };
            Err((status, format!("invalid input: {}", rejection.body_text())))
        }
    }
}

/// Map a core error to a status and a message fit for the user. Service
/// failures are logged here and never shown verbatim.
pub(crate) fn error_response(action: &str, err: WisdomError) -> (StatusCode, String) {
    if err.is_validation() {
        return (StatusCode::BAD_REQUEST, err.to_string());
    }
    tracing::error!("{action} failed: {err:#}");
    if err.is_timeout() {
        (
            StatusCode::GATEWAY_TIMEOUT,
            "The wisdom service took too long to respond. Please try again.".to_string(),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "The wisdom service is unavailable right now. Please try again later.".to_string(),
        )
    }
}

/// Take a search slot, or refuse with 503 when all are busy.
pub(crate) fn search_permit(state: &AppState) -> Result<OwnedSemaphorePermit, (StatusCode, String)> {
    state.search_semaphore.clone().try_acquire_owned().map_err(|_| {
        tracing::warn!("search capacity reached");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Too many searches in progress. Please try again shortly.".to_string(),
        )
    })
}
