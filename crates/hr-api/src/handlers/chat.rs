use axum::{Json, extract::State};
use hr_common::context::CandidateContext;
use hr_common::query::{Constraint, ParsedQuery};
use serde::{Deserialize, Serialize};

use crate::SharedState;
use crate::error::ApiError;

/// Upper bound on `top_k` accepted over HTTP.
pub const MAX_TOP_K: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<i64>,
}

impl ChatRequest {
    fn top_k(&self) -> Result<Option<i64>, ApiError> {
        match self.top_k {
            Some(k) if k > MAX_TOP_K => Err(ApiError::BadRequest(format!(
                "top_k must be at most {MAX_TOP_K}"
            ))),
            other => Ok(other),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub query: String,
    pub relevant_employees: Vec<CandidateContext>,
    pub no_candidates: bool,
    pub constraints: Vec<Constraint>,
    pub snapshot_id: String,
    pub generator: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct InterpretRequest {
    pub query: String,
}

/// Retrieval plus generated answer.
pub async fn chat(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let top_k = request.top_k()?;
    let answer = state.engine.answer(&request.query, top_k).await?;
    let retrieval = answer.retrieval;

    Ok(Json(ChatResponse {
        response: answer.response,
        query: retrieval.parsed.raw_text,
        relevant_employees: retrieval.payload.candidates,
        no_candidates: retrieval.payload.no_candidates,
        constraints: retrieval.parsed.constraints,
        snapshot_id: retrieval.snapshot_id,
        generator: answer.generator,
    }))
}

/// Retrieval core only: parsed query, shortlist and the generation payload.
pub async fn retrieve(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<hr_common::matching::RetrievalOutcome>, ApiError> {
    let top_k = request.top_k()?;
    Ok(Json(state.engine.retrieve(&request.query, top_k).await?))
}

pub async fn interpret(
    State(state): State<SharedState>,
    Json(request): Json<InterpretRequest>,
) -> Result<Json<ParsedQuery>, ApiError> {
    Ok(Json(state.engine.interpret(&request.query)?))
}
