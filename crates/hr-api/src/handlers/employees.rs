use axum::{
    Json,
    extract::{Path, Query, State},
};
use hr_common::matching::DirectorySearch;
use hr_common::store::{DirectoryStats, EmployeeRecord};
use serde::Serialize;

use crate::SharedState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct EmployeeList {
    pub employees: Vec<EmployeeRecord>,
    pub count: usize,
}

impl From<Vec<EmployeeRecord>> for EmployeeList {
    fn from(employees: Vec<EmployeeRecord>) -> Self {
        Self {
            count: employees.len(),
            employees,
        }
    }
}

pub async fn list(State(state): State<SharedState>) -> Result<Json<EmployeeList>, ApiError> {
    Ok(Json(state.engine.all()?.into()))
}

pub async fn get_employee(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<EmployeeRecord>, ApiError> {
    state
        .engine
        .get(id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("employee {id} not found")))
}

pub async fn search(
    State(state): State<SharedState>,
    Query(search): Query<DirectorySearch>,
) -> Result<Json<EmployeeList>, ApiError> {
    let store = state.engine.snapshot()?;
    let matches = search
        .run(&store)?
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();
    Ok(Json(matches.into()))
}

pub async fn stats(State(state): State<SharedState>) -> Result<Json<DirectoryStats>, ApiError> {
    Ok(Json(state.engine.snapshot()?.stats()))
}
