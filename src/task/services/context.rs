//! Dependencies and lookups shared by every task service.

use super::{DeletionTarget, TaskServiceError, TaskServiceResult};
use crate::identity::domain::{Caller, Capability, UserId, UserProfile};
use crate::identity::services::RoleResolver;
use crate::notification::domain::{Notification, NotificationEvent, NotificationKind, Subject};
use crate::notification::services::FanoutEngine;
use crate::persistence::{ChangeSet, CommitReceipt, EngineStore, StoreError};
use crate::task::domain::{
    AssigneeDiff, Assignment, AssignmentKey, Task, TaskDomainError, TaskId,
};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Clone)]
pub(super) struct ServiceContext<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    resolver: RoleResolver<S>,
    fanout: FanoutEngine<S>,
}

impl<S, C> ServiceContext<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    pub(super) fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            resolver: RoleResolver::new(Arc::clone(&store)),
            fanout: FanoutEngine::new(Arc::clone(&store)),
            store,
            clock,
        }
    }

    pub(super) fn store(&self) -> &S {
        &self.store
    }

    pub(super) fn clock(&self) -> &C {
        &self.clock
    }

    /// Resolves an active caller.
    pub(super) async fn caller(&self, user_id: UserId) -> TaskServiceResult<Caller> {
        Ok(self.resolver.resolve(user_id).await?)
    }

    /// Resolves an active caller holding `capability`.
    pub(super) async fn authorize(
        &self,
        user_id: UserId,
        capability: Capability,
    ) -> TaskServiceResult<Caller> {
        let caller = self.caller(user_id).await?;
        caller.require(capability)?;
        Ok(caller)
    }

    /// Loads a task, tombstoned or not.
    pub(super) async fn task(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        self.store
            .find_task(task_id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(task_id))
    }

    /// Loads a task that is not tombstoned.
    pub(super) async fn live_task(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        let task = self.task(task_id).await?;
        if task.is_deleted() {
            return Err(TaskDomainError::TaskDeleted(task_id).into());
        }
        Ok(task)
    }

    /// Loads a profile that is not tombstoned.
    pub(super) async fn active_profile(&self, user_id: UserId) -> TaskServiceResult<UserProfile> {
        let profile = self
            .store
            .find_profile_unfiltered(user_id)
            .await?
            .ok_or(TaskServiceError::UserNotFound(user_id))?;
        if !profile.is_active() {
            return Err(TaskServiceError::UserDeleted(user_id));
        }
        Ok(profile)
    }

    /// Checks that every user in `users` has an active profile.
    pub(super) async fn ensure_assignable(
        &self,
        users: &BTreeSet<UserId>,
    ) -> TaskServiceResult<()> {
        let active = self.store.retain_active(users).await?;
        users
            .difference(&active)
            .next()
            .map_or(Ok(()), |missing| Err(TaskServiceError::UnknownAssignee(*missing)))
    }

    /// Returns the users holding an assignment row on `task_id`.
    ///
    /// The legacy pointer is not consulted.
    pub(super) async fn assignees(&self, task_id: TaskId) -> TaskServiceResult<BTreeSet<UserId>> {
        let rows = self.store.list_assignments(task_id).await?;
        Ok(rows.iter().map(Assignment::user_id).collect())
    }

    /// Plans the rows for `event` against the current store state.
    pub(super) async fn plan(
        &self,
        event: &NotificationEvent,
    ) -> TaskServiceResult<Vec<Notification>> {
        Ok(self.fanout.plan(event, self.clock.utc()).await?)
    }

    /// Stages the assignment rows that move `task` to the `desired` set.
    ///
    /// Returns the staged difference; the legacy pointer is untouched.
    pub(super) async fn stage_assignees(
        &self,
        task: &Task,
        desired: &BTreeSet<UserId>,
        actor: UserId,
        changes: &mut ChangeSet,
    ) -> TaskServiceResult<AssigneeDiff> {
        let current = self.store.list_assignments(task.id()).await?;
        let diff = AssigneeDiff::between(&current, desired);
        for user_id in &diff.removed {
            changes.remove_assignment(AssignmentKey {
                task_id: task.id(),
                user_id: *user_id,
            });
        }
        for user_id in &diff.added {
            changes.insert_assignment(Assignment::new(task.id(), *user_id, actor, &*self.clock));
        }
        Ok(diff)
    }

    /// Commits a change set.
    pub(super) async fn commit(&self, changes: ChangeSet) -> TaskServiceResult<CommitReceipt> {
        self.store.commit(changes).await.map_err(|err| match err {
            StoreError::PendingEditRequestExists(task_id) => {
                TaskServiceError::PendingRequestExists(task_id)
            }
            StoreError::TaskHasPendingEditRequest(task_id) => {
                TaskServiceError::HasPendingEditRequests {
                    target: DeletionTarget::Task(task_id),
                    pending: 1,
                }
            }
            StoreError::TaskDeleted(task_id) => TaskDomainError::TaskDeleted(task_id).into(),
            other => TaskServiceError::Store(other),
        })
    }
}

/// Builds a task-subject event labelled with the task title.
pub(super) fn task_event(
    kind: NotificationKind,
    task: &Task,
    actor: UserId,
) -> TaskServiceResult<NotificationEvent> {
    Ok(NotificationEvent::new(
        kind,
        Subject::Task(task.id()),
        actor,
        task.title(),
    )?)
}
