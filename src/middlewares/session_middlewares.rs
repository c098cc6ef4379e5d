//! Session authentication middleware

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::models::session::Session;
use crate::models::user::User;
use crate::state::AppState;

/// Authenticated caller, inserted into request extensions by
/// [`session_auth`].
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

/// Resolves the `Authorization: Bearer <token>` header against the
/// sessions table.
///
/// Rejects with 401 before any domain logic runs.
pub async fn session_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return AppError::Unauthorized("Not authenticated".to_owned()).into_response();
    };

    match Session::find_user(&state.db_pool, token).await {
        Ok(Some(user)) => {
            let current = CurrentUser {
                user,
                token: token.to_owned(),
            };
            req.extensions_mut().insert(current);
            next.run(req).await
        }
        Ok(None) => AppError::Unauthorized("Not authenticated".to_owned()).into_response(),
        Err(e) => AppError::Database(e).into_response(),
    }
}
