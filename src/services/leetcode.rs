//! LeetCode recurring contest calendar
//!
//! LeetCode does not expose a public schedule API; weekly and biweekly
//! contests follow a fixed cadence, so upcoming occurrences are computed
//! from calendar rules. All functions are pure over the injected `now`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};

use crate::models::contest::CanonicalContest;
use crate::models::contest_type::Category;

pub const PLATFORM_NAME: &str = "LeetCode";

const WEEKLY_NAME: &str = "LeetCode Weekly Contest";
const BIWEEKLY_NAME: &str = "LeetCode Biweekly Contest";

/// Both series run for 90 minutes.
const SERIES_DURATION_SECS: i64 = 5400;

/// Weekly series anchor: Saturday 14:30 UTC.
const WEEKLY_ANCHOR_WEEKDAY: Weekday = Weekday::Sat;
const ANCHOR_HOUR: u32 = 14;
const ANCHOR_MINUTE: u32 = 30;

const BIWEEKLY_PERIOD_DAYS: i64 = 14;

fn anchor_on(date: NaiveDate) -> DateTime<Utc> {
    let time = date
        .and_hms_opt(ANCHOR_HOUR, ANCHOR_MINUTE, 0)
        .expect("valid anchor time");
    Utc.from_utc_datetime(&time)
}

/// Biweekly series origin: 2022-01-08 14:30 UTC, a contest Saturday.
fn biweekly_origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 1, 8, ANCHOR_HOUR, ANCHOR_MINUTE, 0)
        .single()
        .expect("valid biweekly origin")
}

/// Returns the earliest instant at or after `now` that falls on the weekly
/// anchor weekday and time-of-day.
///
/// When `now` is already on the anchor weekday, the same day's anchor time
/// is still a candidate.
pub fn next_weekly(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_ahead = i64::from(
        (WEEKLY_ANCHOR_WEEKDAY.num_days_from_monday() + 7 - now.weekday().num_days_from_monday())
            % 7,
    );
    let candidate = anchor_on(now.date_naive() + Duration::days(days_ahead));

    if candidate >= now {
        candidate
    } else {
        candidate + Duration::days(7)
    }
}

/// Returns the earliest instant strictly after `now` that is an exact
/// multiple of 14 days from the biweekly origin.
pub fn next_biweekly(now: DateTime<Utc>) -> DateTime<Utc> {
    let origin = biweekly_origin();
    let period_secs = BIWEEKLY_PERIOD_DAYS * 86_400;
    let periods = (now - origin).num_seconds().div_euclid(period_secs);

    let candidate = origin + Duration::days(BIWEEKLY_PERIOD_DAYS * periods);
    if candidate > now {
        candidate
    } else {
        candidate + Duration::days(BIWEEKLY_PERIOD_DAYS)
    }
}

/// Computes the upcoming LeetCode contests relative to `now`.
///
/// Takes the next two weekly and next two biweekly occurrences, keeps the
/// strictly-future ones, and returns at most the three earliest. The
/// "two of each, trimmed to three" policy mirrors what the site announces
/// on its contest page.
pub fn compute_upcoming(now: DateTime<Utc>) -> Vec<CanonicalContest> {
    let w1 = next_weekly(now);
    let b1 = next_biweekly(now);

    let occurrences = [
        (w1, Category::Weekly, WEEKLY_NAME),
        (w1 + Duration::days(7), Category::Weekly, WEEKLY_NAME),
        (b1, Category::Biweekly, BIWEEKLY_NAME),
        (
            b1 + Duration::days(BIWEEKLY_PERIOD_DAYS),
            Category::Biweekly,
            BIWEEKLY_NAME,
        ),
    ];

    let mut contests: Vec<CanonicalContest> = occurrences
        .into_iter()
        .filter(|(start, _, _)| start.timestamp() > now.timestamp())
        .map(|(start, category, name)| CanonicalContest {
            platform_name: PLATFORM_NAME,
            name: name.to_owned(),
            start_time: start.timestamp(),
            duration: SERIES_DURATION_SECS,
            category,
        })
        .collect();

    contests.sort_by_key(|c| c.start_time);
    contests.truncate(3);
    contests
}
