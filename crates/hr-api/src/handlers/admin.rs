use axum::{Json, extract::State};
use hr_common::matching::ReloadSummary;

use crate::SharedState;
use crate::error::ApiError;

/// Rebuild the record store from its source. The previous snapshot keeps serving if
/// this fails.
pub async fn reload(State(state): State<SharedState>) -> Result<Json<ReloadSummary>, ApiError> {
    Ok(Json(state.engine.reload().await?))
}
