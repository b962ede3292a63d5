use axum::{
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use hr_api::{AppConfig, build_state, create_router};
use hr_common::config::EngineConfig;
use hr_common::embedding::EmbedderKind;
use hr_common::generation::GeneratorKind;
use tower::ServiceExt;

// Nothing listens on the discard port; no test here may reach it.
const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:9/v1";

fn openai_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.embedding.kind = EmbedderKind::OpenAi;
    config.embedding.api_key = Some("sk-test".into());
    config.embedding.base_url = UNREACHABLE_BASE_URL.into();
    config.generation.kind = GeneratorKind::OpenAi;
    config.generation.api_key = Some("sk-test".into());
    config.generation.base_url = UNREACHABLE_BASE_URL.into();
    config
}

#[tokio::test]
async fn openai_collaborators_start_on_the_server_runtime() {
    let state = build_state(AppConfig::for_tests(), &openai_config()).unwrap();
    assert_eq!(state.engine.embedder().name(), "openai");
    assert_eq!(state.engine.generator_name(), "openai");

    let response = create_router(state.clone())
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // The store is not loaded yet, so chat fails before any embedding request.
    let chat = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"query": "Python developers"}"#))
        .unwrap();
    let response = create_router(state.clone()).oneshot(chat).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    drop(state);
}

#[tokio::test]
async fn openai_without_key_fails_configuration() {
    let mut config = openai_config();
    config.embedding.api_key = None;
    assert!(build_state(AppConfig::for_tests(), &config).is_err());
}
