//! Service layer for multi-assignee management and project rosters.

use super::context::{ServiceContext, task_event};
use super::TaskServiceResult;
use crate::identity::domain::{Capability, UserId};
use crate::notification::domain::NotificationKind;
use crate::persistence::{ChangeSet, EngineStore};
use crate::task::domain::{Assignment, AssignmentKey, ProjectId, TaskId};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of adding an assignee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// A new assignment row was written.
    Added,
    /// The user already had an assignment row; nothing changed.
    AlreadyAssigned,
}

/// Assignment orchestration service.
#[derive(Clone)]
pub struct AssignmentService<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    context: ServiceContext<S, C>,
}

impl<S, C> AssignmentService<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    /// Creates a new assignment service.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            context: ServiceContext::new(store, clock),
        }
    }

    /// Assigns `user_id` to a task and notifies them.
    ///
    /// Adding an existing assignee is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when `actor` lacks
    /// [`Capability::Assign`], a not-found or deleted error for the task or
    /// user, or a store error.
    pub async fn add_assignee(
        &self,
        actor: UserId,
        task_id: TaskId,
        user_id: UserId,
    ) -> TaskServiceResult<AssignOutcome> {
        self.context.authorize(actor, Capability::Assign).await?;
        let task = self.context.live_task(task_id).await?;
        self.context.active_profile(user_id).await?;
        let current = self.context.store().list_assignments(task_id).await?;
        if current.iter().any(|assignment| assignment.user_id() == user_id) {
            debug!(%task_id, %user_id, "user already assigned");
            return Ok(AssignOutcome::AlreadyAssigned);
        }

        let event = task_event(NotificationKind::TaskAssigned, &task, actor)?.naming([user_id]);
        let mut changes = ChangeSet::new();
        changes
            .insert_assignment(Assignment::new(task_id, user_id, actor, self.context.clock()))
            .insert_notifications(self.context.plan(&event).await?);
        let receipt = self.context.commit(changes).await?;
        if receipt.assignments_inserted == 0 {
            return Ok(AssignOutcome::AlreadyAssigned);
        }
        info!(%task_id, %user_id, %actor, "assigned user to task");
        Ok(AssignOutcome::Added)
    }

    /// Removes the assignment row of `user_id`.
    ///
    /// Returns `false` when there was no such row. Removing the last
    /// assignee is allowed. The legacy pointer is not touched.
    ///
    /// # Errors
    ///
    /// Returns an authorization error, a not-found or deleted error for the
    /// task, or a store error.
    pub async fn remove_assignee(
        &self,
        actor: UserId,
        task_id: TaskId,
        user_id: UserId,
    ) -> TaskServiceResult<bool> {
        self.context.authorize(actor, Capability::Assign).await?;
        self.context.live_task(task_id).await?;
        let mut changes = ChangeSet::new();
        changes.remove_assignment(AssignmentKey { task_id, user_id });
        let removed = self.context.commit(changes).await?.assignments_removed > 0;
        if removed {
            info!(%task_id, %user_id, %actor, "unassigned user from task");
        }
        Ok(removed)
    }

    /// Returns the users holding an assignment row on a task.
    ///
    /// The legacy pointer is a read-compat projection and is not included.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::TaskNotFound`] or a store error.
    pub async fn list_assignees(&self, task_id: TaskId) -> TaskServiceResult<BTreeSet<UserId>> {
        self.context.task(task_id).await?;
        self.context.assignees(task_id).await
    }

    /// Returns whether `user_id` holds an assignment row on a task.
    ///
    /// # Errors
    ///
    /// Same as [`AssignmentService::list_assignees`].
    pub async fn is_assignee(&self, task_id: TaskId, user_id: UserId) -> TaskServiceResult<bool> {
        Ok(self.list_assignees(task_id).await?.contains(&user_id))
    }

    /// Points the legacy single-assignee field at the earliest assignment
    /// row, or clears it when there is none.
    ///
    /// Returns the pointer after the call.
    ///
    /// # Errors
    ///
    /// Returns an authorization error, a not-found or deleted error for the
    /// task, or a store error.
    pub async fn sync_legacy_assignee(
        &self,
        actor: UserId,
        task_id: TaskId,
    ) -> TaskServiceResult<Option<UserId>> {
        self.context.authorize(actor, Capability::Assign).await?;
        let mut task = self.context.live_task(task_id).await?;
        let assignments = self.context.store().list_assignments(task_id).await?;
        let earliest = assignments
            .iter()
            .min_by_key(|assignment| (assignment.assigned_at(), assignment.user_id()))
            .map(Assignment::user_id);
        if task.legacy_assignee() == earliest {
            return Ok(earliest);
        }
        let read_version = task.version();
        task.set_legacy_assignee(earliest, self.context.clock());
        let mut changes = ChangeSet::new();
        changes.update_task(task, read_version);
        self.context.commit(changes).await?;
        info!(%task_id, legacy_assignee = ?earliest, "synchronized legacy assignee");
        Ok(earliest)
    }

    /// Materializes the legacy pointer as an assignment row.
    ///
    /// Returns the adopted user, or `None` when the pointer is unset,
    /// already has a row, or names an inactive user.
    ///
    /// # Errors
    ///
    /// Returns an authorization error, a not-found or deleted error for the
    /// task, or a store error.
    pub async fn adopt_legacy_assignee(
        &self,
        actor: UserId,
        task_id: TaskId,
    ) -> TaskServiceResult<Option<UserId>> {
        self.context.authorize(actor, Capability::Assign).await?;
        let task = self.context.live_task(task_id).await?;
        let Some(legacy) = task.legacy_assignee() else {
            return Ok(None);
        };
        let assignments = self.context.store().list_assignments(task_id).await?;
        if assignments.iter().any(|assignment| assignment.user_id() == legacy) {
            return Ok(None);
        }
        let active = self
            .context
            .store()
            .retain_active(&BTreeSet::from([legacy]))
            .await?;
        if active.is_empty() {
            debug!(%task_id, %legacy, "legacy assignee is inactive; not adopted");
            return Ok(None);
        }
        let mut changes = ChangeSet::new();
        changes.insert_assignment(Assignment::new(task_id, legacy, actor, self.context.clock()));
        self.context.commit(changes).await?;
        info!(%task_id, %legacy, "adopted legacy assignee");
        Ok(Some(legacy))
    }

    /// Adds an active user to a project's roster.
    ///
    /// # Errors
    ///
    /// Returns an authorization error, a not-found or deleted error for the
    /// user, or a store error.
    pub async fn add_project_member(
        &self,
        actor: UserId,
        project_id: ProjectId,
        user_id: UserId,
    ) -> TaskServiceResult<()> {
        self.context.authorize(actor, Capability::Assign).await?;
        self.context.active_profile(user_id).await?;
        let mut changes = ChangeSet::new();
        changes.add_project_member(project_id, user_id);
        self.context.commit(changes).await?;
        info!(%project_id, %user_id, "added project member");
        Ok(())
    }

    /// Removes a user from a project's roster.
    ///
    /// # Errors
    ///
    /// Returns an authorization error or a store error.
    pub async fn remove_project_member(
        &self,
        actor: UserId,
        project_id: ProjectId,
        user_id: UserId,
    ) -> TaskServiceResult<()> {
        self.context.authorize(actor, Capability::Assign).await?;
        let mut changes = ChangeSet::new();
        changes.remove_project_member(project_id, user_id);
        self.context.commit(changes).await?;
        info!(%project_id, %user_id, "removed project member");
        Ok(())
    }
}
