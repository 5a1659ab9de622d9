//! Machine-readable classification shared by every service error.
//!
//! Callers render rejected operations directly, so each service error maps
//! onto exactly one [`ErrorKind`] and carries a human-readable reason through
//! its `Display` implementation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable category of a rejected engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The referenced entity does not exist.
    NotFound,
    /// The operation targets a tombstoned entity.
    RecordDeleted,
    /// The status edge is not in the transition table, or the caller lost a
    /// race against a concurrent writer.
    InvalidTransition,
    /// The caller lacks the capability or authority required.
    Forbidden,
    /// An unresolved edit request already exists for the task.
    PendingRequestExists,
    /// The edit request has already been resolved.
    NotPending,
    /// Unresolved edit requests block the deletion.
    HasPendingEditRequests,
    /// The supplied payload is malformed.
    ValidationFailed,
    /// A restore targeted an entity that is not tombstoned.
    NotDeleted,
    /// An unexpected failure; the operation was rolled back.
    Internal,
}

impl ErrorKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::RecordDeleted => "record_deleted",
            Self::InvalidTransition => "invalid_transition",
            Self::Forbidden => "forbidden",
            Self::PendingRequestExists => "pending_request_exists",
            Self::NotPending => "not_pending",
            Self::HasPendingEditRequests => "has_pending_edit_requests",
            Self::ValidationFailed => "validation_failed",
            Self::NotDeleted => "not_deleted",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
