//! Contest listing and aggregation handlers

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::{
    error::AppResult,
    models::{
        contest::{Contest, ContestRow},
        contest_type::ContestType,
    },
    services::aggregator,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct UpdateContestsResponse {
    pub message: &'static str,
    pub count: usize,
}

/// Returns all available contest types.
pub async fn list_contest_types(State(state): State<AppState>) -> AppResult<Json<Vec<ContestType>>> {
    let types = ContestType::list_all(&state.db_pool).await?;
    Ok(Json(types))
}

/// Returns all contests joined with platform and category names, ordered
/// by start time.
pub async fn list_contests(State(state): State<AppState>) -> AppResult<Json<Vec<ContestRow>>> {
    let contests = Contest::list_all(&state.db_pool).await?;
    Ok(Json(contests))
}

/// Runs the aggregation job synchronously and reports how many contests
/// were published.
pub async fn update_contests(
    State(state): State<AppState>,
) -> AppResult<Json<UpdateContestsResponse>> {
    let count = aggregator::run(&state.db_pool, &state.codeforces).await?;
    info!("Contest update triggered via API: {count} contests");

    Ok(Json(UpdateContestsResponse {
        message: "Contests updated",
        count,
    }))
}
