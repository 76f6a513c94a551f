//! Writing reminder use-case service.
//!
//! # Responsibility
//! - Provide create/update/toggle/delete entry points whose persistence
//!   and scheduling effects always travel together.
//!
//! # Invariants
//! - Delete cancels wakeups before removing the record; the degraded
//!   crash state is a stale wakeup that fires as a no-op, never an
//!   un-cancellable record.

use crate::model::reminder::{ActiveDays, ReminderDefinition, ReminderId};
use crate::repo::reminder_repo::ReminderStore;
use crate::schedule::engine::ReminderEngine;
use crate::service::ServiceError;
use chrono::NaiveTime;
use log::info;
use std::sync::Arc;

/// Request model for creating one writing reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReminderRequest {
    pub label: String,
    pub time_of_day: NaiveTime,
    pub active_days: ActiveDays,
    pub fallback_enabled: bool,
}

/// Use-case facade over the reminder store and scheduling engine.
pub struct ReminderService {
    store: Arc<dyn ReminderStore>,
    engine: Arc<ReminderEngine>,
}

impl ReminderService {
    pub fn new(store: Arc<dyn ReminderStore>, engine: Arc<ReminderEngine>) -> Self {
        Self { store, engine }
    }

    /// Persists a new reminder and installs its wakeups.
    pub fn create_reminder(
        &self,
        request: CreateReminderRequest,
    ) -> Result<ReminderDefinition, ServiceError> {
        let mut def =
            ReminderDefinition::new(request.label, request.time_of_day, request.active_days);
        def.fallback_enabled = request.fallback_enabled;

        self.store.create_reminder(&def)?;
        self.engine.schedule_writing_reminder(&def)?;
        info!(
            "event=reminder_create module=service status=ok id={} fallback={}",
            def.id, def.fallback_enabled
        );
        Ok(def)
    }

    /// Persists an edited reminder and reinstalls its wakeups.
    pub fn update_reminder(&self, def: &ReminderDefinition) -> Result<(), ServiceError> {
        self.store.update_reminder(def)?;
        self.engine.schedule_writing_reminder(def)?;
        Ok(())
    }

    /// Toggles a reminder; inactive reminders lose their live wakeups.
    pub fn set_active(&self, id: ReminderId, is_active: bool) -> Result<(), ServiceError> {
        let mut def = self
            .store
            .get_reminder(id)?
            .ok_or(ServiceError::NotFound(id))?;
        def.is_active = is_active;
        self.store.update_reminder(&def)?;
        self.engine.schedule_writing_reminder(&def)?;
        Ok(())
    }

    /// Cancels wakeups, then removes the persisted record.
    pub fn delete_reminder(&self, id: ReminderId) -> Result<(), ServiceError> {
        self.engine.cancel_reminder(id);
        self.store.delete_reminder(id)?;
        info!("event=reminder_delete module=service status=ok id={id}");
        Ok(())
    }

    /// Installs a one-shot snooze wakeup for an existing reminder.
    pub fn snooze(&self, id: ReminderId, minutes: u32) -> Result<(), ServiceError> {
        let def = self
            .store
            .get_reminder(id)?
            .ok_or(ServiceError::NotFound(id))?;
        self.engine.snooze_writing_reminder(def.id, minutes)?;
        Ok(())
    }

    pub fn get_reminder(&self, id: ReminderId) -> Result<Option<ReminderDefinition>, ServiceError> {
        Ok(self.store.get_reminder(id)?)
    }

    pub fn list_reminders(&self) -> Result<Vec<ReminderDefinition>, ServiceError> {
        Ok(self.store.list_all_reminders()?)
    }
}
