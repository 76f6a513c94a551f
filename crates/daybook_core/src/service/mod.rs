//! Core use-case services.
//!
//! # Responsibility
//! - Pair every definition mutation with the matching scheduler call so a
//!   persisted record never drifts apart from its live wakeup.
//! - Keep UI layers decoupled from storage and alarm details.
//!
//! # See also
//! - docs/architecture/reminder-engine.md

use crate::repo::RepoError;
use crate::schedule::engine::ScheduleError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod goal_service;
pub mod reminder_service;

/// Service-layer error for reminder/goal use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Target definition does not exist.
    NotFound(Uuid),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Scheduling-layer failure.
    Schedule(ScheduleError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "definition not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Schedule(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
            Self::Schedule(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ScheduleError> for ServiceError {
    fn from(value: ScheduleError) -> Self {
        Self::Schedule(value)
    }
}
