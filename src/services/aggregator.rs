//! Contest aggregation job
//!
//! Gathers contests from every configured source, resolves foreign keys,
//! and atomically replaces the contest table.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::models::contest::{CanonicalContest, Contest, NewContest};
use crate::models::platform::Platform;
use crate::services::codeforces::{CodeforcesClient, SourceError};
use crate::services::leetcode;

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("contest source failed: {0}")]
    Source(#[from] SourceError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Refreshes the contest table from all sources.
///
/// A Codeforces failure aborts the whole run: publishing a contest list
/// that silently misses an entire platform would be worse than keeping the
/// previous generation. The calendar-rule source cannot fail and is always
/// included.
pub async fn run(
    db_pool: &SqlitePool,
    codeforces: &CodeforcesClient,
) -> Result<usize, AggregationError> {
    let mut records = codeforces.fetch_upcoming().await?;
    records.extend(leetcode::compute_upcoming(Utc::now()));

    let count = publish(db_pool, records).await?;
    info!("Aggregation run published {count} contests");
    Ok(count)
}

/// Resolves platforms and category ids, then replaces the contest set.
pub(crate) async fn publish(
    db_pool: &SqlitePool,
    records: Vec<CanonicalContest>,
) -> Result<usize, AggregationError> {
    let mut platform_ids: HashMap<&'static str, i64> = HashMap::new();
    for record in &records {
        if !platform_ids.contains_key(record.platform_name) {
            let platform = Platform::find_or_create(db_pool, record.platform_name).await?;
            platform_ids.insert(record.platform_name, platform.id);
        }
    }

    let rows: Vec<NewContest> = records
        .into_iter()
        .map(|record| NewContest {
            platform_id: platform_ids[record.platform_name],
            contest_type_id: record.category.id(),
            name: record.name,
            start_time: record.start_time,
            duration: record.duration,
        })
        .collect();

    let count = Contest::replace_all(db_pool, &rows).await?;
    Ok(count)
}
