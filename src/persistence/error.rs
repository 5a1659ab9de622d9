//! Errors shared by every store port.

use crate::error::ErrorKind;
use crate::identity::domain::UserId;
use crate::notification::domain::NotificationId;
use crate::task::domain::{EditRequestId, TaskId};
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store implementations.
///
/// Any error from [`ChangeSetCommitter::commit`](super::ChangeSetCommitter::commit)
/// means no part of the change set was applied.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A profile with the same identifier already exists.
    #[error("duplicate user identifier: {0}")]
    DuplicateUser(UserId),

    /// Another profile already uses the email address.
    #[error("email address already registered: {0}")]
    DuplicateEmail(String),

    /// An unresolved edit request already exists for the task.
    #[error("task {0} already has a pending edit request")]
    PendingEditRequestExists(TaskId),

    /// A tombstone would be written while an edit request is pending.
    #[error("task {0} has a pending edit request and cannot be deleted")]
    TaskHasPendingEditRequest(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// An edit request targets a tombstoned task.
    #[error("task {0} has been deleted")]
    TaskDeleted(TaskId),

    /// The profile was not found.
    #[error("user profile not found: {0}")]
    ProfileNotFound(UserId),

    /// The edit request was not found.
    #[error("edit request not found: {0}")]
    EditRequestNotFound(EditRequestId),

    /// The notification was not found.
    #[error("notification not found: {0}")]
    NotificationNotFound(NotificationId),

    /// The task changed since it was read.
    #[error("task {task_id} was modified concurrently (read version {expected}, stored {actual})")]
    StaleTask {
        /// Task that lost the race.
        task_id: TaskId,
        /// Version the writer read.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// The edit request was resolved since it was read.
    #[error("edit request {0} was resolved concurrently")]
    EditRequestAlreadyResolved(EditRequestId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns the stable classification of this error.
    ///
    /// A lost race on a task maps to [`ErrorKind::InvalidTransition`] and a
    /// lost race on an edit request maps to [`ErrorKind::NotPending`]; the
    /// caller retries against fresh state.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateTask(_) | Self::DuplicateUser(_) | Self::DuplicateEmail(_) => {
                ErrorKind::ValidationFailed
            }
            Self::PendingEditRequestExists(_) => ErrorKind::PendingRequestExists,
            Self::TaskHasPendingEditRequest(_) => ErrorKind::HasPendingEditRequests,
            Self::TaskDeleted(_) => ErrorKind::RecordDeleted,
            Self::TaskNotFound(_)
            | Self::ProfileNotFound(_)
            | Self::EditRequestNotFound(_)
            | Self::NotificationNotFound(_) => ErrorKind::NotFound,
            Self::StaleTask { .. } => ErrorKind::InvalidTransition,
            Self::EditRequestAlreadyResolved(_) => ErrorKind::NotPending,
            Self::Persistence(_) => ErrorKind::Internal,
        }
    }
}
