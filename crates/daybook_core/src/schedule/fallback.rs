//! "Did you actually write today" fallback verification.
//!
//! # Responsibility
//! - Thirty minutes after a writing reminder, check whether any entry was
//!   created in today's local window and nudge only when there is none.
//!
//! # Invariants
//! - Storage failure, timeout or panic while determining "has written"
//!   resolves to "assume written" and silence. The opposite of the day
//!   matcher's fail-open: a missed nudge is cheaper than spamming a user
//!   who already wrote.
//! - Streak lookup failure degrades the message to the streak-zero
//!   variant; it never blocks the nudge.
//! - Storage reads run off the firing context, bounded by a hard timeout
//!   so a hung store cannot hold the completion token forever.

use crate::clock::{local_day_bounds, Clock};
use crate::model::reminder::ReminderDefinition;
use crate::notify::{Notification, NotificationChannel, NotificationPresenter, TapAction};
use crate::repo::journal_repo::{EntryStore, StreakSource};
use crate::schedule::request_code::{request_code, AlarmKind};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::spawn_blocking;
use tokio::time::timeout;

/// Upper bound for each storage read during verification.
pub const FALLBACK_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Asynchronous, cancellation-safe entry check behind the fallback alarm.
pub struct FallbackVerifier {
    entries: Arc<dyn EntryStore>,
    streaks: Arc<dyn StreakSource>,
    presenter: Arc<dyn NotificationPresenter>,
    clock: Arc<dyn Clock>,
}

impl FallbackVerifier {
    pub fn new(
        entries: Arc<dyn EntryStore>,
        streaks: Arc<dyn StreakSource>,
        presenter: Arc<dyn NotificationPresenter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entries,
            streaks,
            presenter,
            clock,
        }
    }

    /// Runs the full verification for one reminder firing.
    ///
    /// Callers hold a completion token across this future; every internal
    /// failure resolves to a return, never a propagated error.
    pub async fn run(&self, def: &ReminderDefinition) {
        let now = self.clock.now();
        let (start_ms, end_ms) = local_day_bounds(now);

        if self.has_written_today(start_ms, end_ms).await {
            info!(
                "event=fallback_check module=schedule status=skipped reason=entry_exists owner={}",
                def.id
            );
            return;
        }

        let streak = self.streak_best_effort().await;
        let body = if streak > 0 {
            format!("Your {streak}-day streak is still alive. A few lines will keep it going.")
        } else {
            "No entry yet today. Even one sentence counts.".to_string()
        };

        let notification = Notification {
            channel: NotificationChannel::FallbackNudges,
            id: request_code(AlarmKind::Fallback, &def.id),
            title: "Still time to write today".to_string(),
            body,
            tap_action: TapAction::OpenComposer,
            inline_actions: Vec::new(),
        };

        match self.presenter.show(notification) {
            Ok(()) => info!(
                "event=fallback_nudge module=schedule status=ok owner={} streak={streak}",
                def.id
            ),
            Err(err) => error!(
                "event=fallback_nudge module=schedule status=error owner={} error={err}",
                def.id
            ),
        }
    }

    /// Point-in-time "at least one entry in today's window" check.
    ///
    /// Any failure shape (store error, worker panic, timeout) answers
    /// `true` so the nudge stays silent.
    async fn has_written_today(&self, start_ms: i64, end_ms: i64) -> bool {
        let entries = Arc::clone(&self.entries);
        let counted = timeout(
            FALLBACK_CHECK_TIMEOUT,
            spawn_blocking(move || entries.count_entries_in_range(start_ms, end_ms)),
        )
        .await;

        match counted {
            Ok(Ok(Ok(count))) => count > 0,
            Ok(Ok(Err(err))) => {
                warn!(
                    "event=fallback_check module=schedule status=assume_written reason=store_error error={err}"
                );
                true
            }
            Ok(Err(join_err)) => {
                warn!(
                    "event=fallback_check module=schedule status=assume_written reason=worker_failure error={join_err}"
                );
                true
            }
            Err(_) => {
                warn!(
                    "event=fallback_check module=schedule status=assume_written reason=timeout budget_ms={}",
                    FALLBACK_CHECK_TIMEOUT.as_millis()
                );
                true
            }
        }
    }

    /// Streak length, degraded to 0 on any failure.
    async fn streak_best_effort(&self) -> u32 {
        let streaks = Arc::clone(&self.streaks);
        let looked_up = timeout(
            FALLBACK_CHECK_TIMEOUT,
            spawn_blocking(move || streaks.current_streak()),
        )
        .await;

        match looked_up {
            Ok(Ok(Ok(streak))) => streak,
            _ => {
                warn!("event=streak_lookup module=schedule status=degraded streak=0");
                0
            }
        }
    }
}
