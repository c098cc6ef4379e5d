//! Contest model and replace-all persistence

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::constants::BATCH_INSERT_SIZE;
use crate::models::contest_type::Category;

/// Provider-agnostic contest record produced by every source before
/// foreign keys are resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalContest {
    pub platform_name: &'static str,
    pub name: String,
    /// Epoch seconds.
    pub start_time: i64,
    /// Seconds.
    pub duration: i64,
    pub category: Category,
}

/// Contest row ready for insertion, foreign keys resolved.
#[derive(Clone, Debug)]
pub struct NewContest {
    pub name: String,
    pub start_time: i64,
    pub duration: i64,
    pub platform_id: i64,
    pub contest_type_id: i64,
}

/// Contest as served by `GET /api/contests`, joined with platform and
/// category names.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ContestRow {
    pub id: i64,
    pub name: String,
    pub start_time: i64,
    pub duration: i64,
    pub platform: String,
    pub contest_type: String,
}

/// Contest inside a reminder window, category id attached for subscriber
/// resolution.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct WindowContest {
    pub id: i64,
    pub name: String,
    pub start_time: i64,
    pub contest_type_id: i64,
}

pub struct Contest;

impl Contest {
    /// Replaces the entire contest table with `records` in one transaction.
    ///
    /// Readers observe either the old complete set or the new complete set;
    /// any failure rolls the whole replacement back.
    pub async fn replace_all(
        db_pool: &SqlitePool,
        records: &[NewContest],
    ) -> Result<usize, sqlx::Error> {
        let mut tx = db_pool.begin().await?;

        sqlx::query("DELETE FROM contests").execute(&mut *tx).await?;

        for chunk in records.chunks(BATCH_INSERT_SIZE) {
            let placeholders = (0..chunk.len())
                .map(|_| "(?, ?, ?, ?, ?)")
                .collect::<Vec<_>>()
                .join(", ");

            let sql = format!(
                "INSERT INTO contests (name, start_time, duration, platform_id, contest_type_id) VALUES {placeholders}"
            );

            let mut query = sqlx::query(&sql);
            for record in chunk {
                query = query
                    .bind(&record.name)
                    .bind(record.start_time)
                    .bind(record.duration)
                    .bind(record.platform_id)
                    .bind(record.contest_type_id);
            }
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;
        debug!("Replaced contest table with {} records", records.len());

        Ok(records.len())
    }

    /// Returns all contests joined with platform and category names,
    /// ordered by start time ascending.
    pub async fn list_all(db_pool: &SqlitePool) -> Result<Vec<ContestRow>, sqlx::Error> {
        sqlx::query_as(
            "SELECT c.id, c.name, c.start_time, c.duration,
                    p.name AS platform, t.name AS contest_type
             FROM contests c
             JOIN platforms p ON c.platform_id = p.id
             JOIN contest_types t ON c.contest_type_id = t.id
             ORDER BY c.start_time ASC",
        )
        .fetch_all(db_pool)
        .await
    }

    /// Returns contests whose start time falls inside `[lo, hi]`.
    pub async fn in_window(
        db_pool: &SqlitePool,
        lo: i64,
        hi: i64,
    ) -> Result<Vec<WindowContest>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, name, start_time, contest_type_id
             FROM contests
             WHERE start_time BETWEEN ? AND ?
             ORDER BY start_time ASC",
        )
        .bind(lo)
        .bind(hi)
        .fetch_all(db_pool)
        .await
    }
}
