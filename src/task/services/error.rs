//! Errors shared by task services.

use crate::error::ErrorKind;
use crate::identity::domain::{AccessDenied, UserId};
use crate::identity::services::IdentityError;
use crate::notification::domain::NotificationDomainError;
use crate::notification::services::NotificationError;
use crate::persistence::StoreError;
use crate::task::domain::{EditRequestId, TaskDomainError, TaskId};
use std::fmt;
use thiserror::Error;

/// Record whose soft delete was blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionTarget {
    /// A task.
    Task(TaskId),
    /// A user profile.
    User(UserId),
}

impl fmt::Display for DeletionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(id) => write!(f, "task {id}"),
            Self::User(id) => write!(f, "user {id}"),
        }
    }
}

/// Service-level errors for task operations.
#[derive(Debug, Clone, Error)]
pub enum TaskServiceError {
    /// A task rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Caller resolution or a profile rule failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The caller lacks a required capability.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// Notification planning failed.
    #[error(transparent)]
    Notification(#[from] NotificationError),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The edit request does not exist.
    #[error("edit request not found: {0}")]
    EditRequestNotFound(EditRequestId),

    /// The target user does not exist.
    #[error("user profile not found: {0}")]
    UserNotFound(UserId),

    /// The target user is tombstoned.
    #[error("user profile {0} has been deleted")]
    UserDeleted(UserId),

    /// A proposed or requested assignee has no active profile.
    #[error("assignee {0} has no active profile")]
    UnknownAssignee(UserId),

    /// The task already has an unresolved edit request.
    #[error("task {0} already has a pending edit request")]
    PendingRequestExists(TaskId),

    /// Unresolved edit requests block a soft delete.
    #[error("{target} has {pending} pending edit request(s)")]
    HasPendingEditRequests {
        /// Record whose deletion was blocked.
        target: DeletionTarget,
        /// Number of blocking requests.
        pending: usize,
    },

    /// Users cannot delete themselves.
    #[error("user {0} cannot delete their own profile")]
    SelfDeletion(UserId),

    /// The reassignment target is the deleted user or not an active user.
    #[error("cannot reassign work of user {user_id} to {target}")]
    InvalidReassignTarget {
        /// User being deleted.
        user_id: UserId,
        /// Rejected target.
        target: UserId,
    },

    /// A purge was requested with a zero batch limit.
    #[error("purge batch limit must be positive")]
    InvalidBatchLimit,
}

impl From<NotificationDomainError> for TaskServiceError {
    fn from(err: NotificationDomainError) -> Self {
        Self::Notification(NotificationError::Domain(err))
    }
}

impl TaskServiceError {
    /// Returns the stable classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(err) => err.kind(),
            Self::Identity(err) => err.kind(),
            Self::Notification(err) => err.kind(),
            Self::Store(err) => err.kind(),
            Self::AccessDenied(_) | Self::SelfDeletion(_) => ErrorKind::Forbidden,
            Self::TaskNotFound(_) | Self::EditRequestNotFound(_) | Self::UserNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::UserDeleted(_) => ErrorKind::RecordDeleted,
            Self::UnknownAssignee(_)
            | Self::InvalidReassignTarget { .. }
            | Self::InvalidBatchLimit => ErrorKind::ValidationFailed,
            Self::PendingRequestExists(_) => ErrorKind::PendingRequestExists,
            Self::HasPendingEditRequests { .. } => ErrorKind::HasPendingEditRequests,
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;
