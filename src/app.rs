//! HTTP routing configuration

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{handlers, middlewares, state};

/// Creates the Axum router with all routes configured.
pub fn app(state: state::AppState) -> Router {
    let auth = from_fn_with_state(
        state.clone(),
        middlewares::session_middlewares::session_auth,
    );

    Router::new()
        // Health check endpoints (no auth required)
        .route("/health", get(handlers::health_handlers::health))
        .route("/ready", get(handlers::health_handlers::ready))
        // Public contest endpoints
        .route(
            "/api/contest-types",
            get(handlers::contest_handlers::list_contest_types),
        )
        .route(
            "/api/contests",
            get(handlers::contest_handlers::list_contests),
        )
        // Operator-triggered aggregation
        .route(
            "/api/updateContests",
            post(handlers::contest_handlers::update_contests),
        )
        // Session lifecycle
        .route(
            "/auth/session",
            post(handlers::auth_handlers::create_session),
        )
        .route(
            "/auth/logout",
            post(handlers::auth_handlers::logout).layer(auth.clone()),
        )
        // Session-gated user endpoints
        .route(
            "/api/user/preferences",
            get(handlers::user_handlers::get_preferences)
                .post(handlers::user_handlers::update_preferences)
                .layer(auth.clone()),
        )
        .route(
            "/api/user/info",
            get(handlers::user_handlers::user_info).layer(auth),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
