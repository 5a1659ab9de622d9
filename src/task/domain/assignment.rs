//! Task assignments and the effective assignee projection.

use super::{Task, TaskId};
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unique key of an assignment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssignmentKey {
    /// Assigned task.
    pub task_id: TaskId,
    /// Assigned user.
    pub user_id: UserId,
}

/// A user assigned to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    task_id: TaskId,
    user_id: UserId,
    assigned_at: DateTime<Utc>,
    assigned_by: UserId,
}

impl Assignment {
    /// Creates an assignment stamped with the current time.
    #[must_use]
    pub fn new(task_id: TaskId, user_id: UserId, assigned_by: UserId, clock: &impl Clock) -> Self {
        Self {
            task_id,
            user_id,
            assigned_at: clock.utc(),
            assigned_by,
        }
    }

    /// Reconstructs an assignment from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        task_id: TaskId,
        user_id: UserId,
        assigned_at: DateTime<Utc>,
        assigned_by: UserId,
    ) -> Self {
        Self {
            task_id,
            user_id,
            assigned_at,
            assigned_by,
        }
    }

    /// Returns the assigned task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the assigned user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns when the assignment was made.
    #[must_use]
    pub const fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }

    /// Returns who made the assignment.
    #[must_use]
    pub const fn assigned_by(&self) -> UserId {
        self.assigned_by
    }

    /// Returns the row key.
    #[must_use]
    pub const fn key(&self) -> AssignmentKey {
        AssignmentKey {
            task_id: self.task_id,
            user_id: self.user_id,
        }
    }
}

/// Returns the effective assignee set: assignment rows plus the legacy
/// single-assignee pointer.
///
/// Only review-completed fanout reads this union. Authorization and
/// assignee queries use the rows alone.
#[must_use]
pub fn effective_assignees(task: &Task, assignments: &[Assignment]) -> BTreeSet<UserId> {
    assignments
        .iter()
        .filter(|assignment| assignment.task_id() == task.id())
        .map(Assignment::user_id)
        .chain(task.legacy_assignee())
        .collect()
}

/// Difference between current assignment rows and a desired assignee set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssigneeDiff {
    /// Users to assign.
    pub added: BTreeSet<UserId>,
    /// Users to unassign.
    pub removed: BTreeSet<UserId>,
}

impl AssigneeDiff {
    /// Computes the rows to add and remove to reach `desired`.
    #[must_use]
    pub fn between(current: &[Assignment], desired: &BTreeSet<UserId>) -> Self {
        let existing: BTreeSet<UserId> = current.iter().map(Assignment::user_id).collect();
        Self {
            added: desired.difference(&existing).copied().collect(),
            removed: existing.difference(desired).copied().collect(),
        }
    }

    /// Returns whether no row changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
