//! Errors shared by notification services.

use crate::error::ErrorKind;
use crate::identity::domain::{AccessDenied, UserId};
use crate::identity::services::IdentityError;
use crate::notification::domain::{NotificationDomainError, NotificationId, Subject};
use crate::persistence::StoreError;
use thiserror::Error;

/// Service-level errors for notification operations.
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// Event construction or rendering failed.
    #[error(transparent)]
    Domain(#[from] NotificationDomainError),

    /// Caller resolution failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The caller lacks a required capability.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// The event subject does not exist.
    #[error("notification subject not found: {0}")]
    SubjectNotFound(Subject),

    /// The event subject is tombstoned.
    #[error("notification subject {0} has been deleted")]
    SubjectDeleted(Subject),

    /// The notification does not exist.
    #[error("notification not found: {0}")]
    NotificationNotFound(NotificationId),

    /// The caller is not the notification's recipient.
    #[error("user {user_id} is not the recipient of notification {notification_id}")]
    NotRecipient {
        /// Targeted notification.
        notification_id: NotificationId,
        /// Rejected caller.
        user_id: UserId,
    },

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl NotificationError {
    /// Returns the stable classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(err) => err.kind(),
            Self::Identity(err) => err.kind(),
            Self::AccessDenied(_) | Self::NotRecipient { .. } => ErrorKind::Forbidden,
            Self::SubjectNotFound(_) | Self::NotificationNotFound(_) => ErrorKind::NotFound,
            Self::SubjectDeleted(_) => ErrorKind::RecordDeleted,
            Self::Store(err) => err.kind(),
        }
    }
}

/// Result type for notification service operations.
pub type NotificationResult<T> = Result<T, NotificationError>;
