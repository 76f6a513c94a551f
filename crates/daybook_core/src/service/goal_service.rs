//! Goal use-case service.
//!
//! # Responsibility
//! - Provide goal CRUD whose persistence and scheduling effects travel
//!   together.
//! - Back the notification's inline mark-done action with an idempotent
//!   check-in write and a transient confirmation.

use crate::clock::Clock;
use crate::model::goal::{GoalDefinition, GoalId};
use crate::model::reminder::ActiveDays;
use crate::notify::NotificationPresenter;
use crate::repo::goal_repo::{CheckInOutcome, GoalStore};
use crate::schedule::engine::ReminderEngine;
use crate::service::ServiceError;
use chrono::NaiveTime;
use log::{info, warn};
use std::sync::Arc;

/// Request model for creating one goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGoalRequest {
    pub title: String,
    pub time_of_day: NaiveTime,
    pub active_days: ActiveDays,
}

/// Use-case facade over the goal store and scheduling engine.
pub struct GoalService {
    store: Arc<dyn GoalStore>,
    engine: Arc<ReminderEngine>,
    presenter: Arc<dyn NotificationPresenter>,
    clock: Arc<dyn Clock>,
}

impl GoalService {
    pub fn new(
        store: Arc<dyn GoalStore>,
        engine: Arc<ReminderEngine>,
        presenter: Arc<dyn NotificationPresenter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            engine,
            presenter,
            clock,
        }
    }

    /// Persists a new goal and installs its check-in wakeup.
    pub fn create_goal(&self, request: CreateGoalRequest) -> Result<GoalDefinition, ServiceError> {
        let def = GoalDefinition::new(request.title, request.time_of_day, request.active_days);
        self.store.create_goal(&def)?;
        self.engine.schedule_goal_reminder(&def)?;
        info!("event=goal_create module=service status=ok id={}", def.id);
        Ok(def)
    }

    /// Persists an edited goal and reinstalls its wakeup.
    pub fn update_goal(&self, def: &GoalDefinition) -> Result<(), ServiceError> {
        self.store.update_goal(def)?;
        self.engine.schedule_goal_reminder(def)?;
        Ok(())
    }

    /// Toggles a goal; inactive goals lose their live wakeup.
    pub fn set_active(&self, id: GoalId, is_active: bool) -> Result<(), ServiceError> {
        let mut def = self.store.get_goal(id)?.ok_or(ServiceError::NotFound(id))?;
        def.is_active = is_active;
        self.store.update_goal(&def)?;
        self.engine.schedule_goal_reminder(&def)?;
        Ok(())
    }

    /// Cancels the wakeup, then removes the persisted record.
    pub fn delete_goal(&self, id: GoalId) -> Result<(), ServiceError> {
        self.engine.cancel_goal_reminder(id);
        self.store.delete_goal(id)?;
        info!("event=goal_delete module=service status=ok id={id}");
        Ok(())
    }

    /// Inline mark-done action: records today's check-in without opening
    /// the app. Idempotent per `(goal, local date)`.
    pub fn mark_checked_in_today(&self, id: GoalId) -> Result<CheckInOutcome, ServiceError> {
        let def = self.store.get_goal(id)?.ok_or(ServiceError::NotFound(id))?;
        let today = self.clock.now().date_naive();
        let outcome = self.store.record_check_in(id, today)?;

        // Confirmation is best-effort; a presenter failure must not undo
        // or fail the recorded check-in.
        if let Err(err) = self
            .presenter
            .show_transient(&format!("Checked in on {}", def.title))
        {
            warn!(
                "event=checkin_confirm module=service status=error id={id} error={err}"
            );
        }

        info!(
            "event=goal_checkin module=service status=ok id={id} date={today} outcome={}",
            match outcome {
                CheckInOutcome::Recorded => "recorded",
                CheckInOutcome::AlreadyRecorded => "already_recorded",
            }
        );
        Ok(outcome)
    }

    pub fn get_goal(&self, id: GoalId) -> Result<Option<GoalDefinition>, ServiceError> {
        Ok(self.store.get_goal(id)?)
    }

    pub fn list_goals(&self) -> Result<Vec<GoalDefinition>, ServiceError> {
        Ok(self.store.list_all_goals()?)
    }
}
