//! Session lifecycle handlers
//!
//! The OAuth handshake with the identity provider happens outside this
//! service; its callback exchanges the verified profile for a session
//! token here.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    config::APP_CONFIG,
    error::AppResult,
    middlewares::session_middlewares::CurrentUser,
    models::{session::Session, user::User},
    state::AppState,
};

/// Verified profile produced by the external login flow.
#[derive(Debug, Deserialize)]
pub struct IdentityProfile {
    pub external_id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub token: String,
    /// Front-end origin to redirect to after login.
    pub redirect: String,
}

/// Creates (or refreshes) the user for a verified identity profile and
/// mints a session token.
pub async fn create_session(
    State(state): State<AppState>,
    Json(profile): Json<IdentityProfile>,
) -> AppResult<Json<CreateSessionResponse>> {
    let user = User::find_or_create(
        &state.db_pool,
        &profile.external_id,
        &profile.name,
        &profile.email,
    )
    .await?;

    let token = Session::create(&state.db_pool, user.id).await?;
    info!("Session created for user {}", user.id);

    Ok(Json(CreateSessionResponse {
        token,
        redirect: APP_CONFIG.frontend_origin.clone(),
    }))
}

/// Deletes the caller's session.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<serde_json::Value>> {
    Session::delete(&state.db_pool, &current.token).await?;
    Ok(Json(json!({ "message": "Signed out successfully." })))
}
