//! Test modules and shared helpers


pub mod helpers {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, Response};
    use axum::Router;
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tower::ServiceExt;

    use crate::models::contest::{Contest, NewContest};
    use crate::models::contest_type::Category;
    use crate::models::platform::Platform;
    use crate::services::codeforces::CodeforcesClient;
    use crate::state::AppState;

    /// In-memory database with the real migrations applied.
    pub async fn setup_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        sqlx::query("PRAGMA foreign_keys=ON")
            .execute(&pool)
            .await
            .unwrap();

        pool
    }

    pub fn test_app(db: SqlitePool) -> Router {
        crate::app::app(AppState::new(db, CodeforcesClient::new()))
    }

    /// Seeds one contest, replacing whatever was there.
    pub async fn seed_contest(db: &SqlitePool, name: &str, start_time: i64, category: Category) {
        let platform = Platform::find_or_create(db, "Codeforces").await.unwrap();
        let record = NewContest {
            name: name.to_owned(),
            start_time,
            duration: 7200,
            platform_id: platform.id,
            contest_type_id: category.id(),
        };
        Contest::replace_all(db, &[record]).await.unwrap();
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    pub fn post_json(uri: &str, token: Option<&str>, payload: &serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder
            .body(Body::from(serde_json::to_string(payload).unwrap()))
            .unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Runs the external-login exchange and returns the session token.
    pub async fn login(app: &Router, external_id: &str, name: &str, email: &str) -> String {
        let payload = serde_json::json!({
            "external_id": external_id,
            "name": name,
            "email": email,
        });

        let response = app
            .clone()
            .oneshot(post_json("/auth/session", None, &payload))
            .await
            .unwrap();

        let body = body_json(response).await;
        body["token"].as_str().unwrap().to_owned()
    }
}
