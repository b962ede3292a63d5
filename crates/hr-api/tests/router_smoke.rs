use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    hr_api::create_router(hr_api::test_state())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

fn ids(employees: &Value) -> Vec<i64> {
    employees
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn livez_is_always_healthy() {
    let (status, body) = get(hr_api::create_router(hr_api::unloaded_test_state()), "/livez").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn chat_returns_only_matching_employees() {
    let (status, body) = post(
        app(),
        "/api/chat",
        json!({ "query": "Find Python developers with 3+ years experience", "top_k": 5 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let mut shortlisted = ids(&body["relevant_employees"]);
    shortlisted.sort_unstable();
    assert_eq!(shortlisted, vec![1, 3]);
    assert_eq!(body["no_candidates"], false);
    assert_eq!(body["generator"], "template");
    assert!(body["response"].as_str().unwrap().contains("Alice Johnson"));
}

#[tokio::test]
async fn chat_with_no_matches_is_not_an_error() {
    let (status, body) = post(
        app(),
        "/api/chat",
        json!({ "query": "Java engineers with 15 years experience" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["no_candidates"], true);
    assert!(body["relevant_employees"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn retrieve_exposes_constraints_and_payload() {
    let (status, body) = post(
        app(),
        "/api/retrieve",
        json!({ "query": "Find developers who know both AWS and Docker", "top_k": 0 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["top_k"], 5);
    let constraint = &body["parsed"]["constraints"][0];
    assert_eq!(constraint["kind"], "skill_in");
    assert_eq!(constraint["skills"], json!(["aws", "docker"]));
    assert_eq!(ids(&body["payload"]["candidates"]), vec![1]);
}

#[tokio::test]
async fn blank_query_and_oversized_top_k_are_bad_requests() {
    let (status, body) = post(app(), "/api/chat", json!({ "query": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, _) = post(app(), "/api/chat", json!({ "query": "anyone", "top_k": 500 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn queries_before_load_are_service_unavailable() {
    let app = hr_api::create_router(hr_api::unloaded_test_state());
    let (status, body) = post(app, "/api/chat", json!({ "query": "anyone" })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "record_store_uninitialized");
}

#[tokio::test]
async fn interpret_reports_department_and_availability() {
    let (status, body) = post(
        app(),
        "/api/query/interpret",
        json!({ "query": "Who is available in the Data Science team?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<_> = body["constraints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["kind"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["availability_equals", "department_equals"]);
    assert_eq!(body["constraints"][1]["department"], "Data Science");
}

#[tokio::test]
async fn employee_directory_routes() {
    let (status, body) = get(app(), "/api/employees").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 4);
    assert_eq!(ids(&body["employees"]), vec![1, 2, 3, 4]);

    let (status, body) = get(app(), "/api/employees/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Carol Lee");

    let (status, body) = get(app(), "/api/employees/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn directory_search_and_stats() {
    let (status, body) = get(
        app(),
        "/api/employees/search?skills=tensorflow,java&min_experience=3",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["employees"]), vec![3]);

    let (status, _) = get(app(), "/api/employees/search?availability=holiday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(app(), "/api/employees/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_employees"], 4);
    assert_eq!(body["available_employees"], 2);
    assert_eq!(body["busy_employees"], 1);
    assert_eq!(body["departments"]["Engineering"], 2);
    assert_eq!(body["top_skills"][0]["skill"], "aws");
}

#[tokio::test]
async fn admin_reload_swaps_the_snapshot() {
    let state = hr_api::test_state();
    let before = state.engine.snapshot().unwrap().snapshot_id().to_string();

    let (status, body) = post(hr_api::create_router(state.clone()), "/api/admin/reload", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["employees"], 4);
    assert_eq!(body["previous_snapshot_id"], before.as_str());
    assert_ne!(state.engine.snapshot().unwrap().snapshot_id(), before);
}
