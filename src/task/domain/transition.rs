//! Append-only audit record of a status transition.

use super::{TaskId, TaskStatus, TransitionId, TransitionKind};
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One applied status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    id: TransitionId,
    task_id: TaskId,
    kind: TransitionKind,
    actor: UserId,
    comment: Option<String>,
    occurred_at: DateTime<Utc>,
}

impl StatusTransition {
    pub(crate) fn record(
        task_id: TaskId,
        kind: TransitionKind,
        actor: UserId,
        comment: Option<&str>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransitionId::new(),
            task_id,
            kind,
            actor,
            comment: comment.map(str::to_owned),
            occurred_at,
        }
    }

    /// Reconstructs a transition record from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: TransitionId,
        task_id: TaskId,
        kind: TransitionKind,
        actor: UserId,
        comment: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_id,
            kind,
            actor,
            comment,
            occurred_at,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> TransitionId {
        self.id
    }

    /// Returns the task that moved.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the edge taken.
    #[must_use]
    pub const fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Returns the status before the transition.
    #[must_use]
    pub const fn from(&self) -> TaskStatus {
        self.kind.edge().0
    }

    /// Returns the status after the transition.
    #[must_use]
    pub const fn to(&self) -> TaskStatus {
        self.kind.edge().1
    }

    /// Returns who made the transition.
    #[must_use]
    pub const fn actor(&self) -> UserId {
        self.actor
    }

    /// Returns the optional comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns when the transition happened.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
