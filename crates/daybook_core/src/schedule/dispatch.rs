//! Delivery dispatcher for fired wakeups.
//!
//! # Responsibility
//! - Turn one wakeup firing into at most one notification (or the
//!   fallback verification), then reinstall that kind's next occurrence.
//!
//! # Invariants
//! - One terminal run per firing; dispatch never loops or recurses.
//! - A denied notification grant short-circuits with zero side effects.
//! - A firing whose owning record is gone or inactive is a harmless
//!   no-op; stale wakeups are expected after crash-interrupted cancels.
//! - Each kind reinstalls only its own slot. A main firing must not touch
//!   the fallback slot, or it would overwrite the same day's still
//!   pending 30-minute check.
//! - A day-gate skip does not reinstall; reconciliation owns repair of
//!   definitions whose wakeups drifted onto inactive days.

use crate::clock::Clock;
use crate::model::goal::GoalDefinition;
use crate::model::reminder::{ActiveDays, ReminderDefinition};
use crate::notify::prompts::writing_prompt_for;
use crate::notify::{
    InlineAction, Notification, NotificationChannel, NotificationPresenter, PermissionProbe,
    TapAction,
};
use crate::repo::goal_repo::GoalStore;
use crate::repo::journal_repo::{EntryStore, StreakSource};
use crate::repo::reminder_repo::ReminderStore;
use crate::schedule::alarm::{AlarmScheduler, ScheduledDeadline};
use crate::schedule::deadline::{next_fallback_occurrence, next_occurrence};
use crate::schedule::fallback::FallbackVerifier;
use crate::schedule::lifecycle::DispatchLifecycle;
use crate::schedule::request_code::{request_code, AlarmKind};
use chrono::Datelike;
use log::{debug, error, info};
use std::sync::Arc;
use uuid::Uuid;

/// Reactive entry point invoked once per fired wakeup.
pub struct DeliveryDispatcher {
    reminders: Arc<dyn ReminderStore>,
    goals: Arc<dyn GoalStore>,
    presenter: Arc<dyn NotificationPresenter>,
    permissions: Arc<dyn PermissionProbe>,
    alarms: Arc<AlarmScheduler>,
    lifecycle: Arc<dyn DispatchLifecycle>,
    clock: Arc<dyn Clock>,
    verifier: FallbackVerifier,
}

impl DeliveryDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reminders: Arc<dyn ReminderStore>,
        goals: Arc<dyn GoalStore>,
        entries: Arc<dyn EntryStore>,
        streaks: Arc<dyn StreakSource>,
        presenter: Arc<dyn NotificationPresenter>,
        permissions: Arc<dyn PermissionProbe>,
        alarms: Arc<AlarmScheduler>,
        lifecycle: Arc<dyn DispatchLifecycle>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let verifier = FallbackVerifier::new(
            entries,
            streaks,
            Arc::clone(&presenter),
            Arc::clone(&clock),
        );
        Self {
            reminders,
            goals,
            presenter,
            permissions,
            alarms,
            lifecycle,
            clock,
            verifier,
        }
    }

    /// Handles one firing of `(kind, owner)`.
    pub async fn dispatch(&self, kind: AlarmKind, owner: Uuid) {
        if !self.permissions.can_show_notifications() {
            info!(
                "event=dispatch module=schedule status=skipped reason=notifications_denied kind={} owner={owner}",
                kind.as_str()
            );
            return;
        }

        match kind {
            AlarmKind::Writing => self.dispatch_writing(owner),
            AlarmKind::Goal => self.dispatch_goal(owner),
            AlarmKind::Snooze => self.dispatch_snooze(owner),
            AlarmKind::Fallback => self.dispatch_fallback(owner).await,
        }
    }

    fn dispatch_writing(&self, owner: Uuid) {
        let Some(def) = self.load_reminder(AlarmKind::Writing, owner) else {
            return;
        };
        if !self.day_gate(AlarmKind::Writing, owner, def.active_days) {
            return;
        }

        let now = self.clock.now();
        let title = if def.label.trim().is_empty() {
            "Time to write".to_string()
        } else {
            def.label.clone()
        };
        self.show(Notification {
            channel: NotificationChannel::WritingReminders,
            id: request_code(AlarmKind::Writing, &owner),
            title,
            body: writing_prompt_for(now.date_naive(), def.time_of_day).to_string(),
            tap_action: TapAction::OpenComposer,
            inline_actions: Vec::new(),
        });

        self.rearm_writing(&def);
    }

    fn dispatch_goal(&self, owner: Uuid) {
        let def = match self.goals.get_goal(owner) {
            Ok(Some(def)) if def.is_active => def,
            Ok(_) => {
                debug!(
                    "event=dispatch module=schedule status=skipped reason=stale_wakeup kind=goal owner={owner}"
                );
                return;
            }
            Err(err) => {
                error!(
                    "event=dispatch module=schedule status=error kind=goal owner={owner} error={err}"
                );
                return;
            }
        };
        if !self.day_gate(AlarmKind::Goal, owner, def.active_days) {
            return;
        }

        self.show(Notification {
            channel: NotificationChannel::GoalCheckins,
            id: request_code(AlarmKind::Goal, &owner),
            title: "Goal check-in".to_string(),
            body: format!("Check in on {}", def.title),
            tap_action: TapAction::OpenGoal(owner),
            inline_actions: vec![InlineAction::MarkGoalDone { goal_id: owner }],
        });

        self.rearm_goal(&def);
    }

    fn dispatch_snooze(&self, owner: Uuid) {
        // A snoozed reminder is an explicit user request: it bypasses the
        // day gate and never reinstalls itself.
        let Some(def) = self.load_reminder(AlarmKind::Snooze, owner) else {
            return;
        };

        let now = self.clock.now();
        self.show(Notification {
            channel: NotificationChannel::WritingReminders,
            id: request_code(AlarmKind::Snooze, &owner),
            title: "Snoozed reminder".to_string(),
            body: writing_prompt_for(now.date_naive(), def.time_of_day).to_string(),
            tap_action: TapAction::OpenComposer,
            inline_actions: Vec::new(),
        });
    }

    async fn dispatch_fallback(&self, owner: Uuid) {
        let Some(def) = self.load_reminder(AlarmKind::Fallback, owner) else {
            return;
        };
        if !def.fallback_enabled {
            debug!(
                "event=dispatch module=schedule status=skipped reason=fallback_disabled owner={owner}"
            );
            return;
        }
        if !self.day_gate(AlarmKind::Fallback, owner, def.active_days) {
            return;
        }

        // The host may tear this context down as soon as the firing
        // callback returns; the token keeps it alive until the check and
        // any nudge are fully issued. Drop doubles as the release path if
        // the future is cancelled mid-await.
        let token = self.lifecycle.begin_async_work();
        self.verifier.run(&def).await;
        self.rearm_fallback(&def);
        token.release();
    }

    fn load_reminder(&self, kind: AlarmKind, owner: Uuid) -> Option<ReminderDefinition> {
        match self.reminders.get_reminder(owner) {
            Ok(Some(def)) if def.is_active => Some(def),
            Ok(_) => {
                debug!(
                    "event=dispatch module=schedule status=skipped reason=stale_wakeup kind={} owner={owner}",
                    kind.as_str()
                );
                None
            }
            Err(err) => {
                error!(
                    "event=dispatch module=schedule status=error kind={} owner={owner} error={err}",
                    kind.as_str()
                );
                None
            }
        }
    }

    fn day_gate(&self, kind: AlarmKind, owner: Uuid, active_days: ActiveDays) -> bool {
        let today = self.clock.now().weekday();
        if active_days.contains(today) {
            return true;
        }
        info!(
            "event=dispatch module=schedule status=skipped reason=day_inactive kind={} owner={owner} weekday={today}",
            kind.as_str()
        );
        false
    }

    fn show(&self, notification: Notification) {
        let channel = notification.channel;
        let id = notification.id;
        match self.presenter.show(notification) {
            Ok(()) => info!(
                "event=notification module=schedule status=ok channel={} id={id}",
                channel.as_str()
            ),
            Err(err) => error!(
                "event=notification module=schedule status=error channel={} id={id} error={err}",
                channel.as_str()
            ),
        }
    }

    fn rearm_writing(&self, def: &ReminderDefinition) {
        let now = self.clock.now();
        let Some(fire_at) = next_occurrence(def.time_of_day, def.active_days, &now) else {
            return;
        };
        self.install(ScheduledDeadline::derive(AlarmKind::Writing, def.id, fire_at));
    }

    fn rearm_goal(&self, def: &GoalDefinition) {
        let now = self.clock.now();
        let Some(fire_at) = next_occurrence(def.time_of_day, def.active_days, &now) else {
            return;
        };
        self.install(ScheduledDeadline::derive(AlarmKind::Goal, def.id, fire_at));
    }

    fn rearm_fallback(&self, def: &ReminderDefinition) {
        let now = self.clock.now();
        let Some(fire_at) = next_fallback_occurrence(def.time_of_day, def.active_days, &now) else {
            return;
        };
        self.install(ScheduledDeadline::derive(
            AlarmKind::Fallback,
            def.id,
            fire_at,
        ));
    }

    fn install(&self, deadline: ScheduledDeadline) {
        if let Err(err) = self.alarms.install(&deadline) {
            error!(
                "event=rearm module=schedule status=error kind={} code={} error={err}",
                deadline.kind.as_str(),
                deadline.code
            );
        }
    }
}
