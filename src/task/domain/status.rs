//! Task status, the transition table, and small task enumerations.

use super::ParseTaskValueError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, work not started.
    ToDo,
    /// An assignee is working on the task.
    WorkInProgress,
    /// Submitted for review; a review request is pending.
    Done,
    /// Approved and archived.
    Closed,
}

impl TaskStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 4] = [Self::ToDo, Self::WorkInProgress, Self::Done, Self::Closed];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "todo",
            Self::WorkInProgress => "work_in_progress",
            Self::Done => "done",
            Self::Closed => "closed",
        }
    }

    /// Looks up the edge from `self` to `target` in the transition table.
    ///
    /// Returns `None` when no such edge exists.
    #[must_use]
    pub const fn transition_to(self, target: Self) -> Option<TransitionKind> {
        match (self, target) {
            (Self::ToDo, Self::WorkInProgress) => Some(TransitionKind::Start),
            (Self::WorkInProgress, Self::Done) => Some(TransitionKind::SubmitForReview),
            (Self::Done, Self::Closed) => Some(TransitionKind::Approve),
            (Self::Done, Self::WorkInProgress) => Some(TransitionKind::RequestChanges),
            (Self::Closed, Self::WorkInProgress) => Some(TransitionKind::Reopen),
            _ => None,
        }
    }

    /// Returns whether the transition table contains an edge to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        self.transition_to(target).is_some()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::ToDo),
            "work_in_progress" => Ok(Self::WorkInProgress),
            "done" => Ok(Self::Done),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseTaskValueError::new("status", value)),
        }
    }
}

/// Who may initiate a given transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionAuthority {
    /// Any current assignee of the task.
    Assignee,
    /// Only holders of the elevated admin role.
    ElevatedAdmin,
}

/// A named edge of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// `ToDo → WorkInProgress`.
    Start,
    /// `WorkInProgress → Done`.
    SubmitForReview,
    /// `Done → Closed`.
    Approve,
    /// `Done → WorkInProgress`.
    RequestChanges,
    /// `Closed → WorkInProgress`.
    Reopen,
}

impl TransitionKind {
    /// Returns the `(from, to)` pair for this edge.
    #[must_use]
    pub const fn edge(self) -> (TaskStatus, TaskStatus) {
        match self {
            Self::Start => (TaskStatus::ToDo, TaskStatus::WorkInProgress),
            Self::SubmitForReview => (TaskStatus::WorkInProgress, TaskStatus::Done),
            Self::Approve => (TaskStatus::Done, TaskStatus::Closed),
            Self::RequestChanges => (TaskStatus::Done, TaskStatus::WorkInProgress),
            Self::Reopen => (TaskStatus::Closed, TaskStatus::WorkInProgress),
        }
    }

    /// Returns who may initiate this edge.
    #[must_use]
    pub const fn authority(self) -> TransitionAuthority {
        match self {
            Self::Start | Self::SubmitForReview => TransitionAuthority::Assignee,
            Self::Approve | Self::RequestChanges | Self::Reopen => {
                TransitionAuthority::ElevatedAdmin
            }
        }
    }

    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SubmitForReview => "submit_for_review",
            Self::Approve => "approve",
            Self::RequestChanges => "request_changes",
            Self::Reopen => "reopen",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransitionKind {
    type Error = ParseTaskValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "start" => Ok(Self::Start),
            "submit_for_review" => Ok(Self::SubmitForReview),
            "approve" => Ok(Self::Approve),
            "request_changes" => Ok(Self::RequestChanges),
            "reopen" => Ok(Self::Reopen),
            _ => Err(ParseTaskValueError::new("transition kind", value)),
        }
    }
}

/// Task priority.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal scheduling.
    #[default]
    Medium,
    /// Ahead of normal work.
    High,
    /// Drop everything.
    Urgent,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParseTaskValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseTaskValueError::new("priority", value)),
        }
    }
}

/// Why a task was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedReason {
    /// Approved by an elevated admin.
    Manual,
    /// Archived together with its project.
    CascadedFromProject,
}

impl ClosedReason {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::CascadedFromProject => "cascaded_from_project",
        }
    }
}

impl TryFrom<&str> for ClosedReason {
    type Error = ParseTaskValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "manual" => Ok(Self::Manual),
            "cascaded_from_project" => Ok(Self::CascadedFromProject),
            _ => Err(ParseTaskValueError::new("closed reason", value)),
        }
    }
}
