//! Contest platform model

use sqlx::SqlitePool;

/// Contest platform (e.g. Codeforces, LeetCode).
///
/// Platforms are created lazily the first time a source reports a new name
/// and are never deleted.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Platform {
    pub id: i64,
    pub name: String,
}

impl Platform {
    /// Returns the platform with the given name, creating it if necessary.
    pub async fn find_or_create(db_pool: &SqlitePool, name: &str) -> Result<Self, sqlx::Error> {
        if let Some(platform) =
            sqlx::query_as::<_, Self>("SELECT id, name FROM platforms WHERE name = ?")
                .bind(name)
                .fetch_optional(db_pool)
                .await?
        {
            return Ok(platform);
        }

        sqlx::query_as("INSERT INTO platforms (name) VALUES (?) RETURNING id, name")
            .bind(name)
            .fetch_one(db_pool)
            .await
    }
}
