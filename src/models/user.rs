//! User model and subscription preferences

use serde::Serialize;
use sqlx::SqlitePool;

use crate::models::contest_type::ContestType;

/// User created on first successful authentication with the external
/// identity provider.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    pub email: String,
}

impl User {
    /// Returns the user for `external_id`, creating the record on first
    /// sighting and refreshing name/email on later logins.
    pub async fn find_or_create(
        db_pool: &SqlitePool,
        external_id: &str,
        name: &str,
        email: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO users (external_id, name, email)
             VALUES (?, ?, ?)
             ON CONFLICT(external_id) DO UPDATE SET name = excluded.name, email = excluded.email
             RETURNING id, external_id, name, email",
        )
        .bind(external_id)
        .bind(name)
        .bind(email)
        .fetch_one(db_pool)
        .await
    }

    /// Returns the contest types this user is subscribed to, ordered by id.
    pub async fn preferences(
        db_pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<ContestType>, sqlx::Error> {
        sqlx::query_as(
            "SELECT t.id, t.name
             FROM contest_types t
             JOIN reminder_preferences rp ON rp.contest_type_id = t.id
             WHERE rp.user_id = ?
             ORDER BY t.id ASC",
        )
        .bind(user_id)
        .fetch_all(db_pool)
        .await
    }

    /// Overwrites the user's entire subscription set with `contest_type_ids`.
    pub async fn replace_preferences(
        db_pool: &SqlitePool,
        user_id: i64,
        contest_type_ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        let mut tx = db_pool.begin().await?;

        sqlx::query("DELETE FROM reminder_preferences WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for contest_type_id in contest_type_ids {
            sqlx::query("INSERT INTO reminder_preferences (user_id, contest_type_id) VALUES (?, ?)")
                .bind(user_id)
                .bind(contest_type_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Returns all users subscribed to the given contest type.
    pub async fn subscribed_to(
        db_pool: &SqlitePool,
        contest_type_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT u.id, u.external_id, u.name, u.email
             FROM users u
             JOIN reminder_preferences rp ON rp.user_id = u.id
             WHERE rp.contest_type_id = ?
             ORDER BY u.id ASC",
        )
        .bind(contest_type_id)
        .fetch_all(db_pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contest_type::Category;
    use crate::tests::helpers::setup_db;

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let db = setup_db().await;

        let created = User::find_or_create(&db, "google-1", "Alice", "alice@example.com")
            .await
            .unwrap();
        let found = User::find_or_create(&db, "google-1", "Alice", "alice@example.com")
            .await
            .unwrap();

        assert_eq!(created.id, found.id);
    }

    #[tokio::test]
    async fn test_find_or_create_refreshes_profile() {
        let db = setup_db().await;

        let created = User::find_or_create(&db, "google-1", "Alice", "alice@example.com")
            .await
            .unwrap();
        let refreshed = User::find_or_create(&db, "google-1", "Alice B.", "alice.b@example.com")
            .await
            .unwrap();

        assert_eq!(created.id, refreshed.id);
        assert_eq!(refreshed.name, "Alice B.");
        assert_eq!(refreshed.email, "alice.b@example.com");
    }

    #[tokio::test]
    async fn test_replace_preferences_overwrites_set() {
        let db = setup_db().await;
        let user = User::find_or_create(&db, "google-1", "Alice", "alice@example.com")
            .await
            .unwrap();

        User::replace_preferences(&db, user.id, &[Category::Weekly.id(), Category::Div2.id()])
            .await
            .unwrap();
        User::replace_preferences(&db, user.id, &[Category::Div3.id()])
            .await
            .unwrap();

        let prefs = User::preferences(&db, user.id).await.unwrap();
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].id, Category::Div3.id());
        assert_eq!(prefs[0].name, "Div3");
    }

    #[tokio::test]
    async fn test_replace_preferences_empty_clears_set() {
        let db = setup_db().await;
        let user = User::find_or_create(&db, "google-1", "Alice", "alice@example.com")
            .await
            .unwrap();

        User::replace_preferences(&db, user.id, &[Category::Weekly.id()])
            .await
            .unwrap();
        User::replace_preferences(&db, user.id, &[]).await.unwrap();

        assert!(User::preferences(&db, user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribed_to_only_matching_users() {
        let db = setup_db().await;
        let alice = User::find_or_create(&db, "google-1", "Alice", "alice@example.com")
            .await
            .unwrap();
        let bob = User::find_or_create(&db, "google-2", "Bob", "bob@example.com")
            .await
            .unwrap();

        User::replace_preferences(&db, alice.id, &[Category::Div2.id()])
            .await
            .unwrap();
        User::replace_preferences(&db, bob.id, &[Category::Weekly.id()])
            .await
            .unwrap();

        let subscribers = User::subscribed_to(&db, Category::Div2.id()).await.unwrap();
        assert_eq!(subscribers.len(), 1);
        assert_eq!(subscribers[0].email, "alice@example.com");
    }
}
