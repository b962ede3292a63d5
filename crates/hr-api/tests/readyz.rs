use axum::{body::Body, http::Request, http::StatusCode};
use std::sync::atomic::Ordering;
use tower::ServiceExt;

async fn status_of(state: hr_api::SharedState, uri: &str) -> StatusCode {
    hr_api::create_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn readyz_returns_service_unavailable_when_not_ready() {
    let state = hr_api::test_state();
    state.readiness.store(false, Ordering::SeqCst);

    assert_eq!(status_of(state, "/readyz").await, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn readyz_waits_for_the_first_load() {
    assert_eq!(
        status_of(hr_api::unloaded_test_state(), "/readyz").await,
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(status_of(hr_api::test_state(), "/readyz").await, StatusCode::OK);
    assert_eq!(status_of(hr_api::test_state(), "/health").await, StatusCode::OK);
}
