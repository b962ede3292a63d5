use std::sync::atomic::Ordering;

use axum::{Json, extract::State};
use serde_json::json;

use crate::SharedState;
use crate::error::ApiError;

pub async fn livez() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn readyz(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.readiness.load(Ordering::SeqCst) {
        return Err(ApiError::ServiceUnavailable("shutting_down".into()));
    }

    let store = state
        .engine
        .snapshot()
        .map_err(|_| ApiError::ServiceUnavailable("record_store_not_loaded".into()))?;

    Ok(Json(json!({
        "status": "ok",
        "application": env!("CARGO_PKG_NAME"),
        "run_id": hr_common::run_id::get(),
        "record_store": {
            "snapshot_id": store.snapshot_id(),
            "loaded_at": store.loaded_at(),
            "employees": store.len(),
            "embedder": store.embedder(),
        },
        "generator": state.engine.generator_name(),
    })))
}
