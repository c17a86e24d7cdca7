use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::{error_response, json_body, search_permit};
use crate::models::{
    ParallelsRequest, ParallelsResponse, SearchMode, SearchRequest, SearchResponse,
    SearchResult, SourcesQuery, SourcesResponse, ThemeSearchRequest, ThemesResponse,
};
use crate::search::{catalog, normalize};
use crate::state::AppState;

/// POST /api/search - Find a verse for a topic, then analyze it and
/// gather parallels from other traditions.
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let req = json_body(payload)?;
    let query = normalize::normalize(&req.query, &req.mode, req.source.as_deref())
        .map_err(|e| error_response("Search", e))?;

    let _permit = search_permit(&state)?;
    tracing::info!(
        mode = %query.mode,
        source = query.source.as_deref().unwrap_or("any"),
        "search started"
    );

    let result = state
        .search
        .search_query(&query)
        .await
        .map_err(|e| error_response("Search", e))?;

    let message = not_found_message(&result, query.source.as_deref());
    Ok(Json(SearchResponse {
        result,
        mode: query.mode,
        message,
    }))
}

/// POST /api/themes/search - Search one of the fixed themes.
pub async fn search_theme(
    State(state): State<AppState>,
    payload: Result<Json<ThemeSearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let req = json_body(payload)?;
    let _permit = search_permit(&state)?;
    let result = state
        .search
        .explore_theme(&req.theme)
        .await
        .map_err(|e| error_response("Theme search", e))?;

    let message = not_found_message(&result, None);
    Ok(Json(SearchResponse {
        result,
        mode: catalog::THEME_MODE,
        message,
    }))
}

/// POST /api/parallels - Parallels for a known verse, optionally limited
/// to another mode's texts or to specific sources.
pub async fn parallels(
    State(state): State<AppState>,
    payload: Result<Json<ParallelsRequest>, JsonRejection>,
) -> Result<Json<ParallelsResponse>, (StatusCode, String)> {
    let req = json_body(payload)?;
    let mode: SearchMode = req
        .target_mode
        .parse()
        .map_err(|e| error_response("Parallels", e))?;
    let targets = req.target_sources.unwrap_or_default();

    let _permit = search_permit(&state)?;
    let parallels = state
        .search
        .find_parallels(&req.verse, &req.tradition, mode, &targets)
        .await
        .map_err(|e| error_response("Parallels", e))?;

    Ok(Json(ParallelsResponse { parallels }))
}

/// GET /api/themes
pub async fn list_themes() -> Json<ThemesResponse> {
    Json(ThemesResponse {
        themes: catalog::THEMES.to_vec(),
        mode: catalog::THEME_MODE,
    })
}

/// GET /api/sources?mode=Religious - Source picker entries for a mode.
pub async fn list_sources(
    Query(q): Query<SourcesQuery>,
) -> Result<Json<SourcesResponse>, (StatusCode, String)> {
    let mode: SearchMode = q.mode.parse().map_err(|e| error_response("Sources", e))?;
    Ok(Json(SourcesResponse {
        mode,
        default_source: catalog::profile(mode).sentinel,
        sources: catalog::source_options(mode),
    }))
}

fn not_found_message(result: &SearchResult, source: Option<&str>) -> Option<String> {
    if result.is_found() {
        return None;
    }
    Some(match source {
        Some(source) => format!(
            "No passage in \"{source}\" could be confidently matched to your topic. \
             Try another source or a broader topic."
        ),
        None => "No passage could be confidently matched to your topic. \
                 Try rephrasing it or choosing another mode."
            .to_string(),
    })
}
