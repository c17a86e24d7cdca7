//! Integration tests for the HTTP surface.
//!
//! The router runs against a canned model so the whole request path can be
//! exercised without network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use wisdom_way::api;
use wisdom_way::config::Config;
use wisdom_way::llm::{ModelClient, OutputSchema};
use wisdom_way::state::AppState;

/// Finds a verse only for "forgive..." topics; fails outright for the
/// "network outage" topic and times out for "slow oracle".
#[derive(Default)]
struct CannedModel {
    calls: AtomicUsize,
}

#[async_trait]
impl ModelClient for CannedModel {
    async fn generate(&self, prompt: &str, schema: &OutputSchema) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match schema.name {
            "verse" if prompt.contains("Topic: network outage") => {
                anyhow::bail!("HTTP 503 from upstream")
            }
            "verse" if prompt.contains("Topic: slow oracle") => {
                let elapsed = tokio::time::timeout(
                    Duration::from_millis(1),
                    std::future::pending::<()>(),
                )
                .await
                .unwrap_err();
                Err(anyhow::Error::new(elapsed).context("deadline hit waiting for upstream"))
            }
            "verse" if prompt.contains("Topic: forgive") => Ok(json!({"verse": {
                "text": "Forgive, and you will be forgiven.",
                "source": "Luke 6:37",
                "tradition": "Christianity"
            }})),
            "verse" => Ok(json!({"verse": null})),
            "analysis" => Ok(json!({
                "analysis": "Mercy shown returns to the one who shows it.",
                "insights": ["Forgiveness is reciprocal", "Judgment rebounds"],
                "reflection": "Letting go of grudges lightens the one who holds them."
            })),
            "parallels" => Ok(json!({"parallels": [
                "Love your enemies. (Matthew 5:44, Christianity)",
                "Conquer anger with non-anger. (Dhammapada 223, Buddhism)"
            ]})),
            "fact" => anyhow::bail!("quota exceeded"),
            other => anyhow::bail!("unexpected schema {other}"),
        }
    }

    async fn transcribe(&self, _audio: &[u8], _mime_type: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(" forgiveness ".to_string())
    }

    async fn generate_image(&self, _prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("data:image/png;base64,iVBORw0KGgo=".to_string())
    }
}

fn app() -> (Router, Arc<CannedModel>) {
    app_with(Config::default())
}

fn app_with(config: Config) -> (Router, Arc<CannedModel>) {
    let model = Arc::new(CannedModel::default());
    let state = AppState::with_model(config, model.clone());
    (api::router(state), model)
}

fn audio_uri(len: usize) -> String {
    format!("data:audio/wav;base64,{}", STANDARD.encode(vec![0u8; len]))
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

#[tokio::test]
async fn test_search_found_returns_full_result() {
    let (router, model) = app();
    let (status, body) = send(
        router,
        "POST",
        "/api/search",
        Some(json!({"query": "forgiveness", "mode": "Religious", "source": "Default (All Religious Texts)"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "Religious");
    assert_eq!(body["verse"]["source"], "Luke 6:37");
    assert_eq!(
        body["analysis"]["insights"],
        "Forgiveness is reciprocal\nJudgment rebounds"
    );
    let parallels = body["parallels"].as_array().unwrap();
    assert_eq!(parallels.len(), 1);
    assert!(parallels[0].as_str().unwrap().contains("Buddhism"));
    assert!(body.get("message").is_none());
    assert_eq!(model.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_search_not_found_is_all_nulls_with_message() {
    let (router, model) = app();
    let (status, body) = send(
        router,
        "POST",
        "/api/search",
        Some(json!({"query": "quantum entanglement", "mode": "Religious", "source": "Talmud"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["verse"].is_null());
    assert!(body["analysis"].is_null());
    assert!(body["parallels"].is_null());
    assert!(body["message"].as_str().unwrap().contains("Talmud"));
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_search_validation_errors_are_400_without_model_calls() {
    for body in [
        json!({"query": "ab", "mode": "Religious"}),
        json!({"query": "forgiveness", "mode": "Mystic"}),
        json!({"query": "forgiveness", "mode": "religious"}),
    ] {
        let (router, model) = app();
        let (status, _) = send(router, "POST", "/api/search", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_search_service_failure_is_503_not_not_found() {
    let (router, _) = app();
    let (status, body) = send(
        router,
        "POST",
        "/api/search",
        Some(json!({"query": "network outage", "mode": "Universalist"})),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let message = body.as_str().unwrap();
    assert!(message.contains("try again"));
    assert!(!message.contains("HTTP 503"));
}

#[tokio::test]
async fn test_search_timeout_is_504_with_friendly_message() {
    let (router, _) = app();
    let (status, body) = send(
        router,
        "POST",
        "/api/search",
        Some(json!({"query": "slow oracle", "mode": "Spiritual"})),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    let message = body.as_str().unwrap();
    assert!(message.contains("try again"));
    assert!(!message.contains("deadline"));
    assert!(!message.contains("elapsed"));
}

#[tokio::test]
async fn test_malformed_bodies_are_400_without_model_calls() {
    for body in [
        json!({"query": "forgiveness"}),
        json!({"mode": "Religious"}),
        json!({"query": "forgiveness", "mode": 7}),
        json!({"query": ["forgiveness"], "mode": "Religious"}),
    ] {
        let (router, model) = app();
        let (status, _) = send(router, "POST", "/api/search", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    let (router, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/search")
        .header("content-type", "application/json")
        .body(Body::from("{\"query\": "))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (router, _) = app();
    let (status, _) = send(router, "POST", "/api/parallels", Some(json!({"verse": "v"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_parallels_endpoint() {
    let (router, _) = app();
    let (status, body) = send(
        router,
        "POST",
        "/api/parallels",
        Some(json!({
            "verse": "Forgive, and you will be forgiven.",
            "tradition": "Christianity",
            "target_mode": "Spiritual",
            "target_sources": ["Tao Te Ching"]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parallels"].as_array().unwrap().len(), 1);

    let (router, _) = app();
    let (status, _) = send(
        router,
        "POST",
        "/api/parallels",
        Some(json!({"verse": "", "tradition": "Christianity", "target_mode": "Spiritual"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_themes_and_theme_search() {
    let (router, _) = app();
    let (status, body) = send(router, "GET", "/api/themes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "Spiritual");
    assert_eq!(body["themes"].as_array().unwrap().len(), 6);

    let (router, _) = app();
    let (status, body) = send(router, "POST", "/api/themes/search", Some(json!({"theme": "Love"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "Spiritual");
    assert!(body["verse"].is_null());

    let (router, _) = app();
    let (status, _) = send(router, "POST", "/api/themes/search", Some(json!({"theme": "Anger"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sources_lists_sentinel_first() {
    let (router, _) = app();
    let (status, body) = send(router, "GET", "/api/sources?mode=Non-Religious", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default_source"], "Default (All Non-Religious Texts)");
    assert_eq!(body["sources"][0], body["default_source"]);

    let (router, _) = app();
    let (status, _) = send(router, "GET", "/api/sources?mode=Agnostic", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fact_falls_back_when_model_fails() {
    let (router, _) = app();
    let (status, body) = send(router, "GET", "/api/fact", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallback"], true);
    assert!(!body["fact"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_transcribe_and_origin_map() {
    let (router, _) = app();
    let (status, body) = send(
        router,
        "POST",
        "/api/transcribe",
        Some(json!({"audio_data_uri": "data:audio/webm;codecs=opus;base64,GkXfow=="})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "forgiveness");

    let (router, model) = app();
    let (status, _) = send(
        router,
        "POST",
        "/api/transcribe",
        Some(json!({"audio_data_uri": "data:text/plain;base64,aGk="})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);

    let (router, _) = app();
    let (status, body) = send(
        router,
        "POST",
        "/api/origin-map",
        Some(json!({"tradition": "Jainism"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["image_url"].as_str().unwrap().starts_with("data:image/png"));
}

#[tokio::test]
async fn test_transcribe_accepts_clips_up_to_the_configured_cap() {
    // Larger than axum's default 2 MB body limit, below the 10 MiB default cap
    let (router, model) = app();
    let (status, body) = send(
        router,
        "POST",
        "/api/transcribe",
        Some(json!({"audio_data_uri": audio_uri(3 * 1024 * 1024)})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "forgiveness");
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_transcribe_rejects_clips_over_the_cap() {
    let small = || Config {
        max_audio_bytes: 1024,
        ..Config::default()
    };

    let (router, model) = app_with(small());
    let (status, _) = send(
        router,
        "POST",
        "/api/transcribe",
        Some(json!({"audio_data_uri": audio_uri(4096)})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);

    let (router, model) = app_with(small());
    let (status, _) = send(
        router,
        "POST",
        "/api/transcribe",
        Some(json!({"audio_data_uri": audio_uri(1024 * 1024)})),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_config_redacts_key_and_rejects_unknown_provider() {
    let (router, _) = app();
    let (status, body) = send(
        router.clone(),
        "PUT",
        "/api/config",
        Some(json!({"provider": "openai", "api_key": "sk-secret", "chat_model": "gpt-4o-mini"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provider"], "openai");
    assert_eq!(body["base_url"], "https://api.openai.com");
    assert_eq!(body["has_api_key"], true);
    assert!(!body.to_string().contains("sk-secret"));

    let (status, body) = send(router.clone(), "GET", "/api/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chat_model"], "gpt-4o-mini");

    let (status, _) = send(router, "PUT", "/api/config", Some(json!({"provider": "acme"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_capacity_exhausted_is_503() {
    let model = Arc::new(CannedModel::default());
    let config = Config {
        max_concurrent_searches: 1,
        ..Config::default()
    };
    let state = AppState::with_model(config, model);
    let _held = state.search_semaphore.clone().try_acquire_owned().unwrap();

    let (status, _) = send(
        api::router(state),
        "POST",
        "/api/search",
        Some(json!({"query": "forgiveness", "mode": "Religious"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health() {
    let (router, _) = app();
    let (status, body) = send(router, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
