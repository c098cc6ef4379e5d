//! Session token storage
//!
//! The identity-provider handshake itself happens outside this service; a
//! session row is what its callback leaves behind.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::user::User;

pub struct Session;

impl Session {
    /// Mints a new opaque session token for the user.
    pub async fn create(db_pool: &SqlitePool, user_id: i64) -> Result<String, sqlx::Error> {
        let token = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO sessions (token, user_id) VALUES (?, ?)")
            .bind(&token)
            .bind(user_id)
            .execute(db_pool)
            .await?;

        Ok(token)
    }

    /// Resolves a session token to its user, if the session exists.
    pub async fn find_user(
        db_pool: &SqlitePool,
        token: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(
            "SELECT u.id, u.external_id, u.name, u.email
             FROM users u
             JOIN sessions s ON s.user_id = u.id
             WHERE s.token = ?",
        )
        .bind(token)
        .fetch_optional(db_pool)
        .await
    }

    /// Deletes the session for `token`, signing the user out.
    pub async fn delete(db_pool: &SqlitePool, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(db_pool)
            .await?;
        Ok(())
    }
}
