//! Application state shared across handlers

use sqlx::SqlitePool;

use crate::services::codeforces::CodeforcesClient;

/// Shared application state accessible via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub codeforces: CodeforcesClient,
}

impl AppState {
    #[must_use]
    pub const fn new(db_pool: SqlitePool, codeforces: CodeforcesClient) -> Self {
        Self { db_pool, codeforces }
    }
}
