//! Edit requests: audited proposals to change an immutable task record.

use super::{EditRequestId, ParseTaskValueError, ProposedChanges, TaskDomainError, TaskId};
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolution state of an edit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditRequestStatus {
    /// Awaiting an elevated admin.
    Pending,
    /// Applied to the task.
    Approved,
    /// Declined; the task is unchanged.
    Rejected,
}

impl EditRequestStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for EditRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EditRequestStatus {
    type Error = ParseTaskValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseTaskValueError::new("edit request status", value)),
        }
    }
}

/// How an edit request came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditRequestOrigin {
    /// Proposed by a coordinator and resolved by an elevated admin.
    Requested,
    /// Synthesized for audit parity by a direct edit.
    Direct,
}

impl EditRequestOrigin {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Direct => "direct",
        }
    }
}

impl TryFrom<&str> for EditRequestOrigin {
    type Error = ParseTaskValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "requested" => Ok(Self::Requested),
            "direct" => Ok(Self::Direct),
            _ => Err(ParseTaskValueError::new("edit request origin", value)),
        }
    }
}

/// Reviewer's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Apply the proposal.
    Approve,
    /// Decline the proposal.
    Reject,
}

impl ReviewDecision {
    const fn terminal_status(self) -> EditRequestStatus {
        match self {
            Self::Approve => EditRequestStatus::Approved,
            Self::Reject => EditRequestStatus::Rejected,
        }
    }
}

/// A proposed change set against one task.
///
/// Everything but the resolution fields is fixed at creation; those are
/// written exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    id: EditRequestId,
    task_id: TaskId,
    requester: UserId,
    proposed: ProposedChanges,
    status: EditRequestStatus,
    origin: EditRequestOrigin,
    reviewer: Option<UserId>,
    reviewed_at: Option<DateTime<Utc>>,
    comments: Option<String>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted edit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedEditRequestData {
    /// Persisted identifier.
    pub id: EditRequestId,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted requester.
    pub requester: UserId,
    /// Persisted proposal.
    pub proposed: ProposedChanges,
    /// Persisted status.
    pub status: EditRequestStatus,
    /// Persisted origin.
    pub origin: EditRequestOrigin,
    /// Persisted reviewer.
    pub reviewer: Option<UserId>,
    /// Persisted resolution timestamp.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Persisted reviewer comments.
    pub comments: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl EditRequest {
    /// Creates a pending request.
    #[must_use]
    pub fn pending(
        task_id: TaskId,
        requester: UserId,
        proposed: ProposedChanges,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: EditRequestId::new(),
            task_id,
            requester,
            proposed,
            status: EditRequestStatus::Pending,
            origin: EditRequestOrigin::Requested,
            reviewer: None,
            reviewed_at: None,
            comments: None,
            created_at: clock.utc(),
        }
    }

    /// Creates an already-approved request recording a direct edit.
    #[must_use]
    pub fn direct(
        task_id: TaskId,
        editor: UserId,
        proposed: ProposedChanges,
        comment: Option<String>,
        clock: &impl Clock,
    ) -> Self {
        let now = clock.utc();
        Self {
            id: EditRequestId::new(),
            task_id,
            requester: editor,
            proposed,
            status: EditRequestStatus::Approved,
            origin: EditRequestOrigin::Direct,
            reviewer: Some(editor),
            reviewed_at: Some(now),
            comments: comment,
            created_at: now,
        }
    }

    /// Reconstructs a request from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedEditRequestData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            requester: data.requester,
            proposed: data.proposed,
            status: data.status,
            origin: data.origin,
            reviewer: data.reviewer,
            reviewed_at: data.reviewed_at,
            comments: data.comments,
            created_at: data.created_at,
        }
    }

    /// Returns the request identifier.
    #[must_use]
    pub const fn id(&self) -> EditRequestId {
        self.id
    }

    /// Returns the targeted task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the requester.
    #[must_use]
    pub const fn requester(&self) -> UserId {
        self.requester
    }

    /// Returns the proposed changes.
    #[must_use]
    pub const fn proposed(&self) -> &ProposedChanges {
        &self.proposed
    }

    /// Returns the resolution status.
    #[must_use]
    pub const fn status(&self) -> EditRequestStatus {
        self.status
    }

    /// Returns whether the request awaits resolution.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, EditRequestStatus::Pending)
    }

    /// Returns how the request came to exist.
    #[must_use]
    pub const fn origin(&self) -> EditRequestOrigin {
        self.origin
    }

    /// Returns the reviewer, once resolved.
    #[must_use]
    pub const fn reviewer(&self) -> Option<UserId> {
        self.reviewer
    }

    /// Returns the resolution timestamp, once resolved.
    #[must_use]
    pub const fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed_at
    }

    /// Returns reviewer comments.
    #[must_use]
    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Writes the resolution fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EditRequestNotPending`] when the request is
    /// already resolved; the request is left unchanged.
    pub fn resolve(
        &mut self,
        reviewer: UserId,
        decision: ReviewDecision,
        comments: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.is_pending() {
            return Err(TaskDomainError::EditRequestNotPending {
                request_id: self.id,
                status: self.status,
            });
        }
        self.status = decision.terminal_status();
        self.reviewer = Some(reviewer);
        self.reviewed_at = Some(clock.utc());
        self.comments = comments;
        Ok(())
    }
}
