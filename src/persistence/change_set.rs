//! Unit of work carrying every write of one engine operation.

use crate::identity::domain::{UserId, UserProfile};
use crate::notification::domain::{Notification, NotificationId};
use crate::task::domain::{
    Assignment, AssignmentKey, EditRequest, ProjectId, StatusTransition, Task,
};
use chrono::{DateTime, Utc};

/// A single staged write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Insert a new profile.
    InsertProfile(UserProfile),
    /// Overwrite an existing profile.
    UpdateProfile(UserProfile),
    /// Insert a new task.
    InsertTask(Task),
    /// Overwrite a task, provided its stored version still equals
    /// `read_version`.
    UpdateTask {
        /// The mutated task.
        task: Task,
        /// Version the writer read before mutating.
        read_version: u64,
    },
    /// Insert an assignment; an existing (task, user) pair is left alone.
    InsertAssignment(Assignment),
    /// Delete an assignment if present.
    RemoveAssignment(AssignmentKey),
    /// Add a user to a project roster; an existing membership is left alone.
    AddProjectMember {
        /// Project.
        project_id: ProjectId,
        /// Member.
        user_id: UserId,
    },
    /// Remove a user from a project roster if present.
    RemoveProjectMember {
        /// Project.
        project_id: ProjectId,
        /// Member.
        user_id: UserId,
    },
    /// Insert a new edit request.
    InsertEditRequest(EditRequest),
    /// Write the resolution of an edit request that must still be pending.
    ResolveEditRequest(EditRequest),
    /// Append a status transition record.
    RecordTransition(StatusTransition),
    /// Insert a notification; a row with the same deduplication key is left
    /// alone.
    InsertNotification(Notification),
    /// Stamp a notification as read unless it already is.
    MarkNotificationRead {
        /// Notification.
        id: NotificationId,
        /// Read timestamp.
        read_at: DateTime<Utc>,
    },
}

/// Ordered list of writes committed all-or-nothing.
///
/// Changes are applied in the order they were staged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a raw change.
    pub fn push(&mut self, change: Change) -> &mut Self {
        self.changes.push(change);
        self
    }

    /// Stages a profile insert.
    pub fn insert_profile(&mut self, profile: UserProfile) -> &mut Self {
        self.push(Change::InsertProfile(profile))
    }

    /// Stages a profile overwrite.
    pub fn update_profile(&mut self, profile: UserProfile) -> &mut Self {
        self.push(Change::UpdateProfile(profile))
    }

    /// Stages a task insert.
    pub fn insert_task(&mut self, task: Task) -> &mut Self {
        self.push(Change::InsertTask(task))
    }

    /// Stages a version-guarded task overwrite.
    pub fn update_task(&mut self, task: Task, read_version: u64) -> &mut Self {
        self.push(Change::UpdateTask { task, read_version })
    }

    /// Stages an assignment insert.
    pub fn insert_assignment(&mut self, assignment: Assignment) -> &mut Self {
        self.push(Change::InsertAssignment(assignment))
    }

    /// Stages an assignment removal.
    pub fn remove_assignment(&mut self, key: AssignmentKey) -> &mut Self {
        self.push(Change::RemoveAssignment(key))
    }

    /// Stages a project membership insert.
    pub fn add_project_member(&mut self, project_id: ProjectId, user_id: UserId) -> &mut Self {
        self.push(Change::AddProjectMember {
            project_id,
            user_id,
        })
    }

    /// Stages a project membership removal.
    pub fn remove_project_member(&mut self, project_id: ProjectId, user_id: UserId) -> &mut Self {
        self.push(Change::RemoveProjectMember {
            project_id,
            user_id,
        })
    }

    /// Stages an edit request insert.
    pub fn insert_edit_request(&mut self, request: EditRequest) -> &mut Self {
        self.push(Change::InsertEditRequest(request))
    }

    /// Stages a pending-guarded edit request resolution.
    pub fn resolve_edit_request(&mut self, request: EditRequest) -> &mut Self {
        self.push(Change::ResolveEditRequest(request))
    }

    /// Stages a transition record.
    pub fn record_transition(&mut self, transition: StatusTransition) -> &mut Self {
        self.push(Change::RecordTransition(transition))
    }

    /// Stages notification inserts.
    pub fn insert_notifications(
        &mut self,
        notifications: impl IntoIterator<Item = Notification>,
    ) -> &mut Self {
        self.changes
            .extend(notifications.into_iter().map(Change::InsertNotification));
        self
    }

    /// Stages a read stamp.
    pub fn mark_notification_read(
        &mut self,
        id: NotificationId,
        read_at: DateTime<Utc>,
    ) -> &mut Self {
        self.push(Change::MarkNotificationRead { id, read_at })
    }

    /// Returns the staged changes in order.
    #[must_use]
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Consumes the change set, yielding its changes in order.
    #[must_use]
    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    /// Returns the number of staged changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns whether nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// What a successful commit actually wrote.
///
/// Conflict-ignoring inserts that hit an existing row are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Assignment rows inserted.
    pub assignments_inserted: usize,
    /// Assignment rows removed.
    pub assignments_removed: usize,
    /// Notification rows inserted.
    pub notifications_inserted: usize,
    /// Notification rows newly stamped as read.
    pub notifications_marked_read: usize,
}
