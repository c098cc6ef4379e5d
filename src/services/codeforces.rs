//! Codeforces contest source
//!
//! Fetches the public `contest.list` API and normalizes its rows into
//! canonical contest records.

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::APP_CONFIG;
use crate::models::contest::CanonicalContest;
use crate::models::contest_type::Category;

pub const PLATFORM_NAME: &str = "Codeforces";

/// Contests still waiting to start carry this phase marker.
const PHASE_BEFORE: &str = "BEFORE";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("codeforces request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("codeforces returned status {0}")]
    Status(String),

    #[error("unexpected codeforces payload: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ContestListResponse {
    status: String,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    result: Vec<ApiContest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiContest {
    name: String,
    phase: String,
    #[serde(default)]
    start_time_seconds: Option<i64>,
    duration_seconds: i64,
}

/// Maps a contest name to its category.
///
/// Patterns are checked in order; the first match wins. Educational rounds
/// are grouped with Div2 subscribers.
pub fn classify(name: &str) -> Category {
    const PATTERNS: [(&str, Category); 5] = [
        ("div. 1", Category::Div1),
        ("div. 2", Category::Div2),
        ("div. 3", Category::Div3),
        ("div. 4", Category::Div4),
        ("educational", Category::Div2),
    ];

    let name = name.to_lowercase();
    PATTERNS
        .iter()
        .find(|(pattern, _)| name.contains(pattern))
        .map_or(Category::Other, |(_, category)| *category)
}

/// Normalizes an API response into canonical records.
///
/// Keeps contests that have not started yet and whose start time is
/// strictly after `now_epoch`; the source occasionally serves entries it
/// forgot to move out of the BEFORE phase.
fn normalize(
    response: ContestListResponse,
    now_epoch: i64,
) -> Result<Vec<CanonicalContest>, SourceError> {
    if response.status != "OK" {
        return Err(SourceError::Status(
            response.comment.unwrap_or(response.status),
        ));
    }

    let contests = response
        .result
        .into_iter()
        .filter_map(|contest| {
            let start_time = contest.start_time_seconds?;
            if contest.phase != PHASE_BEFORE || start_time <= now_epoch {
                return None;
            }
            let category = classify(&contest.name);
            Some(CanonicalContest {
                platform_name: PLATFORM_NAME,
                name: contest.name,
                start_time,
                duration: contest.duration_seconds,
                category,
            })
        })
        .collect();

    Ok(contests)
}

/// HTTP client for the Codeforces contest list.
#[derive(Clone)]
pub struct CodeforcesClient {
    client: Client,
    url: String,
}

impl CodeforcesClient {
    /// Builds a client with the configured endpoint and a bounded timeout
    /// so a hung source cannot stall an aggregation run.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(APP_CONFIG.http_timeout_secs))
                .build()
                .expect("http client"),
            url: APP_CONFIG.codeforces_api_url.clone(),
        }
    }

    /// Fetches and normalizes the upcoming contest list.
    ///
    /// Fails on transport errors, a non-OK status field, or a payload shape
    /// mismatch. Retrying is the caller's concern.
    pub async fn fetch_upcoming(&self) -> Result<Vec<CanonicalContest>, SourceError> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: ContestListResponse = serde_json::from_str(&body)?;
        normalize(response, Utc::now().timestamp())
    }
}

impl Default for CodeforcesClient {
    fn default() -> Self {
        Self::new()
    }
}
