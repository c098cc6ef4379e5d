//! User preference and profile handlers

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    middlewares::session_middlewares::CurrentUser,
    models::{
        contest_type::{Category, ContestType},
        user::User,
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    #[serde(rename = "contestTypeIds")]
    pub contest_type_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub name: String,
    pub email: String,
    pub preferences: Vec<ContestType>,
}

/// Returns the caller's subscribed contest types.
pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<ContestType>>> {
    let prefs = User::preferences(&state.db_pool, current.user.id).await?;
    Ok(Json(prefs))
}

/// Replaces the caller's entire subscription set.
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdatePreferencesRequest>,
) -> AppResult<Json<serde_json::Value>> {
    for id in &payload.contest_type_ids {
        if Category::from_id(*id).is_none() {
            return Err(AppError::BadRequest(format!("Unknown contest type id {id}")));
        }
    }

    User::replace_preferences(&state.db_pool, current.user.id, &payload.contest_type_ids).await?;

    Ok(Json(json!({ "message": "Preferences updated" })))
}

/// Returns the caller's profile together with their preferences.
pub async fn user_info(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserInfoResponse>> {
    let preferences = User::preferences(&state.db_pool, current.user.id).await?;

    Ok(Json(UserInfoResponse {
        name: current.user.name,
        email: current.user.email,
        preferences,
    }))
}
