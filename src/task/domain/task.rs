//! Task aggregate root and its lifecycle rules.

use super::{
    ClosedReason, Priority, ProjectId, ProposedChanges, StatusTransition, TaskDomainError, TaskId,
    TaskStatus, TransitionAuthority, normalize_title,
};
use crate::identity::domain::{Role, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Review metadata carried while a task is in or leaving review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewMetadata {
    /// Assignee who submitted the task for review.
    pub requested_by: Option<UserId>,
    /// When the review was requested.
    pub requested_at: Option<DateTime<Utc>>,
    /// Elevated admin who approved the task.
    pub reviewed_by: Option<UserId>,
    /// When the task was approved.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer comments recorded at approval.
    pub comments: Option<String>,
}

impl ReviewMetadata {
    /// Returns whether a review request is pending.
    #[must_use]
    pub const fn has_pending_request(&self) -> bool {
        self.requested_by.is_some() && self.requested_at.is_some()
    }
}

/// Archival stamp present exactly when a task is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    /// When the task was archived.
    pub archived_at: DateTime<Utc>,
    /// Who archived the task.
    pub archived_by: UserId,
    /// Why the task was closed.
    pub reason: ClosedReason,
}

/// Tombstone stamp present while a task is soft-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tombstone {
    /// When the record was tombstoned.
    pub deleted_at: DateTime<Utc>,
    /// Who tombstoned the record.
    pub deleted_by: UserId,
}

/// Who is attempting a transition, as seen by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionActor {
    /// Caller identifier.
    pub user_id: UserId,
    /// Caller role.
    pub role: Role,
    /// Whether the caller is an effective assignee of the task.
    pub is_assignee: bool,
}

impl TransitionActor {
    const fn satisfies(self, authority: TransitionAuthority) -> bool {
        match authority {
            TransitionAuthority::Assignee => self.is_assignee,
            TransitionAuthority::ElevatedAdmin => matches!(self.role, Role::ElevatedAdmin),
        }
    }
}

/// Proof that the edit-request workflow authorized a content change.
///
/// Only the workflow can mint a grant, so task content cannot be changed
/// from any other write path.
#[derive(Debug)]
pub struct EditGrant(());

impl EditGrant {
    pub(crate) const fn issue() -> Self {
        Self(())
    }
}

/// Fields supplied when creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTaskData {
    /// Task title.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Priority.
    pub priority: Priority,
    /// Owning project; `None` for a standalone task.
    pub project_id: Option<ProjectId>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: Option<ProjectId>,
    title: String,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    priority: Priority,
    status: TaskStatus,
    review: ReviewMetadata,
    archive: Option<ArchiveMetadata>,
    tombstone: Option<Tombstone>,
    legacy_assignee: Option<UserId>,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted project reference.
    pub project_id: Option<ProjectId>,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted due date.
    pub due_date: Option<NaiveDate>,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted review metadata.
    pub review: ReviewMetadata,
    /// Persisted archive stamp.
    pub archive: Option<ArchiveMetadata>,
    /// Persisted tombstone.
    pub tombstone: Option<Tombstone>,
    /// Persisted legacy single-assignee pointer.
    pub legacy_assignee: Option<UserId>,
    /// Persisted creator.
    pub created_by: UserId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted optimistic-concurrency version.
    pub version: u64,
}

impl Task {
    /// Creates a new task in [`TaskStatus::ToDo`].
    ///
    /// # Errors
    ///
    /// Returns a title error when the title is blank or too long.
    pub fn new(
        data: NewTaskData,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let title = normalize_title(&data.title)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            project_id: data.project_id,
            title,
            description: data.description,
            due_date: data.due_date,
            priority: data.priority,
            status: TaskStatus::ToDo,
            review: ReviewMetadata::default(),
            archive: None,
            tombstone: None,
            legacy_assignee: None,
            created_by,
            created_at: timestamp,
            updated_at: timestamp,
            version: 0,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            priority: data.priority,
            status: data.status,
            review: data.review,
            archive: data.archive,
            tombstone: data.tombstone,
            legacy_assignee: data.legacy_assignee,
            created_by: data.created_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
            version: data.version,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project, if any.
    #[must_use]
    pub const fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the review metadata.
    #[must_use]
    pub const fn review(&self) -> &ReviewMetadata {
        &self.review
    }

    /// Returns the archive stamp, present exactly when closed.
    #[must_use]
    pub const fn archive(&self) -> Option<&ArchiveMetadata> {
        self.archive.as_ref()
    }

    /// Returns the tombstone, present while soft-deleted.
    #[must_use]
    pub const fn tombstone(&self) -> Option<&Tombstone> {
        self.tombstone.as_ref()
    }

    /// Returns whether the task is soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.tombstone.is_some()
    }

    /// Returns the legacy single-assignee pointer.
    #[must_use]
    pub const fn legacy_assignee(&self) -> Option<UserId> {
        self.legacy_assignee
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the optimistic-concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns whether the status/metadata invariants hold.
    ///
    /// `Closed` iff archived, and `Done` iff a review request is pending.
    #[must_use]
    pub const fn invariants_hold(&self) -> bool {
        let closed = matches!(self.status, TaskStatus::Closed);
        let done = matches!(self.status, TaskStatus::Done);
        closed == self.archive.is_some() && done == self.review.has_pending_request()
    }

    /// Applies a status transition with its bound side effects.
    ///
    /// On success the task is mutated and the audit record for the
    /// transition is returned. On failure the task is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskDeleted`] for a tombstoned task,
    /// [`TaskDomainError::InvalidStateTransition`] for an edge outside the
    /// transition table, or [`TaskDomainError::TransitionForbidden`] when the
    /// actor lacks the edge's authority.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        actor: TransitionActor,
        comment: Option<&str>,
        clock: &impl Clock,
    ) -> Result<StatusTransition, TaskDomainError> {
        if self.is_deleted() {
            return Err(TaskDomainError::TaskDeleted(self.id));
        }
        let from = self.status;
        let kind = from
            .transition_to(target)
            .ok_or(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from,
                to: target,
                role: actor.role,
            })?;
        if !actor.satisfies(kind.authority()) {
            return Err(TaskDomainError::TransitionForbidden {
                task_id: self.id,
                kind,
                user_id: actor.user_id,
                role: actor.role,
            });
        }

        let now = clock.utc();
        let note = comment.map(str::trim).filter(|text| !text.is_empty());
        match target {
            TaskStatus::Done => {
                self.review = ReviewMetadata {
                    requested_by: Some(actor.user_id),
                    requested_at: Some(now),
                    ..ReviewMetadata::default()
                };
            }
            TaskStatus::Closed => {
                self.review = ReviewMetadata {
                    reviewed_by: Some(actor.user_id),
                    reviewed_at: Some(now),
                    comments: note.map(str::to_owned),
                    ..ReviewMetadata::default()
                };
                self.archive = Some(ArchiveMetadata {
                    archived_at: now,
                    archived_by: actor.user_id,
                    reason: ClosedReason::Manual,
                });
            }
            TaskStatus::WorkInProgress | TaskStatus::ToDo => {
                self.review = ReviewMetadata::default();
                self.archive = None;
            }
        }
        self.status = target;
        self.touch(now);
        debug_assert!(self.invariants_hold(), "transition broke task invariants");

        Ok(StatusTransition::record(
            self.id,
            kind,
            actor.user_id,
            note,
            now,
        ))
    }

    /// Applies proposed field changes authorized by the edit workflow.
    ///
    /// The assignee part of the proposal is not handled here; assignments
    /// are separate records.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskDeleted`] for a tombstoned task or a
    /// validation error for a malformed proposal.
    pub fn apply_changes(
        &mut self,
        changes: &ProposedChanges,
        _grant: EditGrant,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.is_deleted() {
            return Err(TaskDomainError::TaskDeleted(self.id));
        }
        changes.validate()?;
        if !changes.touches_fields() {
            return Ok(());
        }

        if let Some(title) = changes.title() {
            self.title = normalize_title(title)?;
        }
        changes
            .description()
            .clone()
            .trimmed()
            .apply_to(&mut self.description);
        changes.due_date().clone().apply_to(&mut self.due_date);
        if let Some(priority) = changes.priority() {
            self.priority = priority;
        }
        self.touch(clock.utc());
        Ok(())
    }

    /// Tombstones the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskDeleted`] when already tombstoned.
    pub fn tombstone_by(
        &mut self,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.is_deleted() {
            return Err(TaskDomainError::TaskDeleted(self.id));
        }
        let now = clock.utc();
        self.tombstone = Some(Tombstone {
            deleted_at: now,
            deleted_by: actor,
        });
        self.touch(now);
        Ok(())
    }

    /// Clears the tombstone.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskNotDeleted`] when the task is active.
    pub fn restore(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if !self.is_deleted() {
            return Err(TaskDomainError::TaskNotDeleted(self.id));
        }
        self.tombstone = None;
        self.touch(clock.utc());
        Ok(())
    }

    /// Rewrites the legacy single-assignee pointer.
    ///
    /// Only compatibility code paths call this; multi-assignee operations
    /// never do.
    pub fn set_legacy_assignee(&mut self, assignee: Option<UserId>, clock: &impl Clock) {
        self.legacy_assignee = assignee;
        self.touch(clock.utc());
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }
}
