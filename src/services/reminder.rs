//! Reminder sweep service
//!
//! On a fixed tick, finds contests entering the notification window and
//! emails every subscribed user once.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use sqlx::SqlitePool;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::config::APP_CONFIG;
use crate::models::contest::{Contest, WindowContest};
use crate::models::user::User;
use crate::services::sender::MailSender;

/// Periodic sweep over the contest table.
///
/// Sweeps are serialized: the ticker only fires again after the previous
/// sweep finished, so a slow batch of sends can never overlap the next one.
pub struct ReminderSweep<M: MailSender> {
    db_pool: SqlitePool,
    mailer: M,
    /// Seconds before contest start at which the reminder goes out.
    lead_secs: i64,
    /// Half-width of the notification window, covering tick jitter.
    tolerance_secs: i64,
    /// Pause between consecutive sends, for outbound rate limits.
    send_delay: Duration,
    /// Contests already notified, keyed by id; entries are dropped once
    /// the contest has started, which outlives any window overlap.
    notified: HashMap<i64, i64>,
}

impl<M: MailSender> ReminderSweep<M> {
    #[must_use]
    pub fn new(db_pool: SqlitePool, mailer: M) -> Self {
        Self {
            db_pool,
            mailer,
            lead_secs: APP_CONFIG.reminder_lead_secs,
            tolerance_secs: APP_CONFIG.reminder_tolerance_secs,
            send_delay: Duration::from_millis(APP_CONFIG.send_delay_ms),
            notified: HashMap::new(),
        }
    }

    /// Runs the sweep loop until the process shuts down.
    pub async fn run(mut self) {
        info!(
            "Reminder sweep started: tick={}s, lead={}s, tolerance={}s",
            APP_CONFIG.reminder_tick_secs, self.lead_secs, self.tolerance_secs
        );

        let mut interval =
            tokio::time::interval(Duration::from_secs(APP_CONFIG.reminder_tick_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let now = Utc::now().timestamp();
            if let Err(e) = self.sweep(now).await {
                error!("Reminder sweep failed: {e}");
            }
        }
    }

    /// Performs one sweep at instant `now`, returning the number of
    /// reminders dispatched.
    async fn sweep(&mut self, now: i64) -> Result<usize, sqlx::Error> {
        self.notified.retain(|_, start_time| *start_time > now);

        let lo = now + self.lead_secs - self.tolerance_secs;
        let hi = now + self.lead_secs + self.tolerance_secs;
        let contests = Contest::in_window(&self.db_pool, lo, hi).await?;

        let mut dispatched = 0;
        for contest in contests {
            if self.notified.contains_key(&contest.id) {
                debug!("Contest {} already notified, skipping", contest.id);
                continue;
            }
            dispatched += self.notify_subscribers(&contest).await?;
            self.notified.insert(contest.id, contest.start_time);
        }

        if dispatched > 0 {
            info!("Dispatched {dispatched} reminders");
        }
        Ok(dispatched)
    }

    /// Emails every user subscribed to the contest's category.
    ///
    /// A failed send is logged and skipped; one bad address must not starve
    /// the remaining recipients.
    async fn notify_subscribers(&self, contest: &WindowContest) -> Result<usize, sqlx::Error> {
        let users = User::subscribed_to(&self.db_pool, contest.contest_type_id).await?;

        let subject = format!("Reminder: {} starts soon!", contest.name);
        let mut dispatched = 0;

        for user in users {
            let body = reminder_body(&user.name, &contest.name, contest.start_time);
            match self.mailer.send(&user.email, &subject, &body).await {
                Ok(()) => {
                    debug!("Reminder sent to {}", user.email);
                    dispatched += 1;
                }
                Err(e) => error!("Reminder to {} failed: {e}", user.email),
            }
            tokio::time::sleep(self.send_delay).await;
        }

        Ok(dispatched)
    }
}

fn reminder_body(user_name: &str, contest_name: &str, start_time: i64) -> String {
    let start = Utc
        .timestamp_opt(start_time, 0)
        .single()
        .map_or_else(|| start_time.to_string(), |dt| dt.format("%Y-%m-%d %H:%M UTC").to_string());

    format!("Hi {user_name},\n\n{contest_name} starts at {start}.\n\nGood luck!")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::models::contest::NewContest;
    use crate::models::contest_type::Category;
    use crate::models::platform::Platform;
    use crate::services::sender::SendEmailError;
    use crate::tests::helpers::setup_db;

    /// Records sends instead of talking to SES; optionally fails for one
    /// recipient.
    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
        fail_for: Option<String>,
    }

    impl MailSender for &'static RecordingMailer {
        async fn send(
            &self,
            recipient: &str,
            subject: &str,
            _body: &str,
        ) -> Result<(), SendEmailError> {
            if self.fail_for.as_deref() == Some(recipient) {
                return Err(SendEmailError::Sdk("mailbox unavailable".to_owned()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipient.to_owned(), subject.to_owned()));
            Ok(())
        }
    }

    fn leak(mailer: RecordingMailer) -> &'static RecordingMailer {
        Box::leak(Box::new(mailer))
    }

    fn sweep_with(
        db: SqlitePool,
        mailer: &'static RecordingMailer,
    ) -> ReminderSweep<&'static RecordingMailer> {
        ReminderSweep {
            db_pool: db,
            mailer,
            lead_secs: 1200,
            tolerance_secs: 30,
            send_delay: Duration::ZERO,
            notified: HashMap::new(),
        }
    }

    async fn seed_contest(db: &SqlitePool, name: &str, start_time: i64, category: Category) {
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

    async fn seed_user(db: &SqlitePool, external_id: &str, email: &str, categories: &[Category]) {
        let user = User::find_or_create(db, external_id, external_id, email)
            .await
            .unwrap();
        let ids: Vec<i64> = categories.iter().map(|c| c.id()).collect();
        User::replace_preferences(db, user.id, &ids).await.unwrap();
    }

    #[tokio::test]
    async fn test_sweep_notifies_only_subscribed_users() {
        let db = setup_db().await;
        let now = 1_000_000;
        seed_contest(&db, "Round X (Div. 2)", now + 1200, Category::Div2).await;
        seed_user(&db, "a", "a@example.com", &[Category::Div2]).await;
        seed_user(&db, "b", "b@example.com", &[Category::Weekly]).await;

        let mailer = leak(RecordingMailer::default());
        let mut sweep = sweep_with(db, mailer);

        let dispatched = sweep.sweep(now).await.unwrap();
        assert_eq!(dispatched, 1);

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "a@example.com");
        assert_eq!(sent[0].1, "Reminder: Round X (Div. 2) starts soon!");
    }

    #[tokio::test]
    async fn test_sweep_window_bounds() {
        let db = setup_db().await;
        let now = 1_000_000;
        // Inside the window at exactly now + lead.
        seed_contest(&db, "In window", now + 1200, Category::Div2).await;
        seed_user(&db, "a", "a@example.com", &[Category::Div2]).await;

        let mailer = leak(RecordingMailer::default());
        let mut sweep = sweep_with(db.clone(), mailer);
        assert_eq!(sweep.sweep(now).await.unwrap(), 1);

        // A contest 25 minutes out is not yet eligible.
        seed_contest(&db, "Too far", now + 1500, Category::Div2).await;
        let mailer2 = leak(RecordingMailer::default());
        let mut sweep2 = sweep_with(db, mailer2);
        assert_eq!(sweep2.sweep(now).await.unwrap(), 0);
        assert!(mailer2.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adjacent_ticks_do_not_double_send() {
        let db = setup_db().await;
        let now = 1_000_000;
        seed_contest(&db, "Round X", now + 1200, Category::Div2).await;
        seed_user(&db, "a", "a@example.com", &[Category::Div2]).await;

        let mailer = leak(RecordingMailer::default());
        let mut sweep = sweep_with(db, mailer);

        // The contest sits inside the window on two consecutive ticks; the
        // notified set suppresses the second send.
        assert_eq!(sweep.sweep(now).await.unwrap(), 1);
        assert_eq!(sweep.sweep(now + 20).await.unwrap(), 0);
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_notified_set_is_pruned_after_start() {
        let db = setup_db().await;
        let now = 1_000_000;
        seed_contest(&db, "Round X", now + 1200, Category::Div2).await;
        seed_user(&db, "a", "a@example.com", &[Category::Div2]).await;

        let mailer = leak(RecordingMailer::default());
        let mut sweep = sweep_with(db, mailer);

        sweep.sweep(now).await.unwrap();
        assert_eq!(sweep.notified.len(), 1);

        // Once the contest has started the marker is dropped.
        sweep.sweep(now + 1300).await.unwrap();
        assert!(sweep.notified.is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_does_not_abort_sweep() {
        let db = setup_db().await;
        let now = 1_000_000;
        seed_contest(&db, "Round X", now + 1200, Category::Div2).await;
        seed_user(&db, "a", "a@example.com", &[Category::Div2]).await;
        seed_user(&db, "b", "b@example.com", &[Category::Div2]).await;
        seed_user(&db, "c", "c@example.com", &[Category::Div2]).await;

        let mailer = leak(RecordingMailer {
            sent: Mutex::new(Vec::new()),
            fail_for: Some("b@example.com".to_owned()),
        });
        let mut sweep = sweep_with(db, mailer);

        let dispatched = sweep.sweep(now).await.unwrap();
        assert_eq!(dispatched, 2);

        let sent = mailer.sent.lock().unwrap();
        let recipients: Vec<&str> = sent.iter().map(|(to, _)| to.as_str()).collect();
        assert_eq!(recipients, vec!["a@example.com", "c@example.com"]);
    }

    #[test]
    fn test_reminder_body_formats_start_time() {
        let body = reminder_body("Alice", "Round X", 1_700_000_000);
        assert!(body.starts_with("Hi Alice,"));
        assert!(body.contains("Round X starts at 2023-11-14 22:13 UTC"));
        assert!(body.ends_with("Good luck!"));
    }
}
