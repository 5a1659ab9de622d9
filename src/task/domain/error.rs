//! Error types for task domain validation and lifecycle rules.

use super::{EditRequestId, EditRequestStatus, TaskId, TaskStatus, TransitionKind};
use crate::error::ErrorKind;
use crate::identity::domain::{Role, UserId};
use thiserror::Error;

/// Errors returned by task aggregate operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the maximum length.
    #[error("task title is {length} characters, maximum is {max}")]
    TitleTooLong {
        /// Length of the rejected title.
        length: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// An edit proposal names no field at all.
    #[error("proposed changes must modify at least one field")]
    EmptyProposal,

    /// The status edge is not in the transition table.
    #[error("task {task_id} cannot move from {from} to {to} (caller role {role})")]
    InvalidStateTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
        /// Role of the caller, for diagnostics.
        role: Role,
    },

    /// The caller lacks authority for a valid edge.
    #[error("user {user_id} with role {role} may not {kind} task {task_id}")]
    TransitionForbidden {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// The edge that was attempted.
        kind: TransitionKind,
        /// Caller identifier.
        user_id: UserId,
        /// Caller role.
        role: Role,
    },

    /// The task is tombstoned.
    #[error("task {0} has been deleted")]
    TaskDeleted(TaskId),

    /// A restore targeted a task that is still active.
    #[error("task {0} is not deleted")]
    TaskNotDeleted(TaskId),

    /// The edit request has already been resolved.
    #[error("edit request {request_id} is already {status}")]
    EditRequestNotPending {
        /// The resolved request.
        request_id: EditRequestId,
        /// Its terminal status.
        status: EditRequestStatus,
    },
}

impl TaskDomainError {
    /// Returns the stable classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } | Self::EmptyProposal => {
                ErrorKind::ValidationFailed
            }
            Self::InvalidStateTransition { .. } => ErrorKind::InvalidTransition,
            Self::TransitionForbidden { .. } => ErrorKind::Forbidden,
            Self::TaskDeleted(_) => ErrorKind::RecordDeleted,
            Self::TaskNotDeleted(_) => ErrorKind::NotDeleted,
            Self::EditRequestNotPending { .. } => ErrorKind::NotPending,
        }
    }
}

/// Error returned while parsing task enumerations from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task {field}: {value}")]
pub struct ParseTaskValueError {
    field: &'static str,
    value: String,
}

impl ParseTaskValueError {
    /// Creates a parse error for `field` with the rejected raw value.
    #[must_use]
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Returns the rejected raw value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}
