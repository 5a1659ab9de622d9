//! Service layer for task creation, retrieval, and status transitions.

use super::context::{ServiceContext, task_event};
use super::{TaskServiceError, TaskServiceResult};
use crate::identity::domain::{Capability, UserId};
use crate::notification::domain::NotificationKind;
use crate::persistence::{ChangeSet, EngineStore, StoreError};
use crate::task::domain::{
    Assignment, NewTaskData, Priority, ProjectId, StatusTransition, Task, TaskDomainError, TaskId,
    TaskStatus, TransitionActor, TransitionKind,
};
use chrono::NaiveDate;
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    data: NewTaskData,
    assignees: BTreeSet<UserId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            data: NewTaskData {
                title: title.into(),
                ..NewTaskData::default()
            },
            assignees: BTreeSet::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.data.description = Some(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.data.due_date = Some(due_date);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.data.priority = priority;
        self
    }

    /// Places the task in a project.
    #[must_use]
    pub const fn in_project(mut self, project_id: ProjectId) -> Self {
        self.data.project_id = Some(project_id);
        self
    }

    /// Sets the initial assignees.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assignees = assignees.into_iter().collect();
        self
    }
}

/// Result of an implicit interaction with a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// The task moved from to-do to work-in-progress.
    Started(Task),
    /// Nothing changed.
    Unchanged(Task),
}

impl InteractionOutcome {
    /// Returns the task after the interaction.
    #[must_use]
    pub const fn task(&self) -> &Task {
        match self {
            Self::Started(task) | Self::Unchanged(task) => task,
        }
    }
}

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    context: ServiceContext<S, C>,
}

impl<S, C> TaskLifecycleService<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            context: ServiceContext::new(store, clock),
        }
    }

    /// Creates a task in to-do with its initial assignees.
    ///
    /// Initial assignees receive a task-assigned notification in the same
    /// commit.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when `actor` lacks
    /// [`Capability::CreateTask`], [`TaskServiceError::UnknownAssignee`]
    /// when an assignee is not an active user, a validation error, or a
    /// store error.
    pub async fn create_task(
        &self,
        actor: UserId,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<Task> {
        self.context.authorize(actor, Capability::CreateTask).await?;
        let task = Task::new(request.data, actor, self.context.clock())?;
        self.context.ensure_assignable(&request.assignees).await?;

        let mut changes = ChangeSet::new();
        changes.insert_task(task.clone());
        for user_id in &request.assignees {
            changes.insert_assignment(Assignment::new(
                task.id(),
                *user_id,
                actor,
                self.context.clock(),
            ));
        }
        if !request.assignees.is_empty() {
            let event = task_event(NotificationKind::TaskAssigned, &task, actor)?
                .naming(request.assignees.iter().copied());
            changes.insert_notifications(self.context.plan(&event).await?);
        }
        self.context.commit(changes).await?;
        info!(
            task_id = %task.id(),
            %actor,
            assignees = request.assignees.len(),
            "created task"
        );
        Ok(task)
    }

    /// Finds a task visible to `viewer`.
    ///
    /// Callers holding [`Capability::ViewAll`] see every task; everyone
    /// else sees the tasks they are assigned to.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when the task is missing
    /// or hidden, a domain error when it is tombstoned, or a store error.
    pub async fn find_task(&self, viewer: UserId, task_id: TaskId) -> TaskServiceResult<Task> {
        let caller = self.context.caller(viewer).await?;
        let task = self.context.live_task(task_id).await?;
        if !caller.can(Capability::ViewAll) && !self.is_assignee(&task, viewer).await? {
            return Err(TaskServiceError::TaskNotFound(task_id));
        }
        Ok(task)
    }

    /// Lists the non-tombstoned tasks visible to `viewer`.
    ///
    /// # Errors
    ///
    /// Returns a caller resolution or store error.
    pub async fn list_active_tasks(&self, viewer: UserId) -> TaskServiceResult<Vec<Task>> {
        let caller = self.context.caller(viewer).await?;
        let tasks = self.context.store().list_active_tasks().await?;
        if caller.can(Capability::ViewAll) {
            return Ok(tasks);
        }
        let assigned: BTreeSet<TaskId> = self
            .context
            .store()
            .list_assignments_for_user(viewer)
            .await?
            .iter()
            .map(Assignment::task_id)
            .collect();
        Ok(tasks
            .into_iter()
            .filter(|task| {
                assigned.contains(&task.id()) || task.legacy_assignee() == Some(viewer)
            })
            .collect())
    }

    /// Moves a task to `target` along whichever edge of the status machine
    /// connects them.
    ///
    /// The status change, its audit record, and any review notification
    /// commit together; a concurrent writer that changed the task first
    /// makes this call fail with nothing written.
    ///
    /// # Errors
    ///
    /// Returns a domain error for a tombstoned task, an edge outside the
    /// transition table, or an actor without the edge's authority;
    /// [`TaskServiceError::TaskNotFound`]; a caller resolution error; or a
    /// store error, including [`StoreError::StaleTask`] on a lost race.
    pub async fn transition(
        &self,
        actor: UserId,
        task_id: TaskId,
        target: TaskStatus,
        comment: Option<&str>,
    ) -> TaskServiceResult<Task> {
        self.apply_transition(actor, task_id, target, None, comment)
            .await
    }

    /// Starts work on a to-do task.
    ///
    /// # Errors
    ///
    /// Same as [`TaskLifecycleService::transition`]; the task must be in
    /// to-do.
    pub async fn start(&self, actor: UserId, task_id: TaskId) -> TaskServiceResult<Task> {
        self.transition_along(actor, task_id, TransitionKind::Start, None)
            .await
    }

    /// Submits work for review, notifying administrators.
    ///
    /// # Errors
    ///
    /// Same as [`TaskLifecycleService::transition`]; the task must be in
    /// progress.
    pub async fn submit_for_review(
        &self,
        actor: UserId,
        task_id: TaskId,
    ) -> TaskServiceResult<Task> {
        self.transition_along(actor, task_id, TransitionKind::SubmitForReview, None)
            .await
    }

    /// Approves reviewed work, closing and archiving the task.
    ///
    /// # Errors
    ///
    /// Same as [`TaskLifecycleService::transition`]; the task must be done.
    pub async fn approve(
        &self,
        actor: UserId,
        task_id: TaskId,
        comments: Option<&str>,
    ) -> TaskServiceResult<Task> {
        self.transition_along(actor, task_id, TransitionKind::Approve, comments)
            .await
    }

    /// Sends reviewed work back to the assignees.
    ///
    /// # Errors
    ///
    /// Same as [`TaskLifecycleService::transition`]; the task must be done.
    pub async fn request_changes(
        &self,
        actor: UserId,
        task_id: TaskId,
        comments: Option<&str>,
    ) -> TaskServiceResult<Task> {
        self.transition_along(actor, task_id, TransitionKind::RequestChanges, comments)
            .await
    }

    /// Reopens a closed task, clearing its archive stamp.
    ///
    /// # Errors
    ///
    /// Same as [`TaskLifecycleService::transition`]; the task must be
    /// closed.
    pub async fn reopen(
        &self,
        actor: UserId,
        task_id: TaskId,
        comments: Option<&str>,
    ) -> TaskServiceResult<Task> {
        self.transition_along(actor, task_id, TransitionKind::Reopen, comments)
            .await
    }

    /// Records that `user_id` interacted with a task.
    ///
    /// The first interaction by an assignee with a to-do task
    /// starts it. Anything else leaves the task unchanged.
    ///
    /// # Errors
    ///
    /// Returns a domain error for a tombstoned task,
    /// [`TaskServiceError::TaskNotFound`], a caller resolution error, or a
    /// store error.
    pub async fn record_interaction(
        &self,
        user_id: UserId,
        task_id: TaskId,
    ) -> TaskServiceResult<InteractionOutcome> {
        self.context.caller(user_id).await?;
        let task = self.context.live_task(task_id).await?;
        if task.status() != TaskStatus::ToDo || !self.is_assignee(&task, user_id).await? {
            debug!(%task_id, %user_id, status = %task.status(), "interaction left task unchanged");
            return Ok(InteractionOutcome::Unchanged(task));
        }
        match self.start(user_id, task_id).await {
            Ok(started) => Ok(InteractionOutcome::Started(started)),
            Err(
                TaskServiceError::Store(StoreError::StaleTask { .. })
                | TaskServiceError::Domain(TaskDomainError::InvalidStateTransition { .. }),
            ) => {
                let current = self.context.task(task_id).await?;
                Ok(InteractionOutcome::Unchanged(current))
            }
            Err(err) => Err(err),
        }
    }

    /// Returns the audit trail of a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`], an authorization error
    /// when `viewer` can neither view all tasks nor is assigned, or a store
    /// error.
    pub async fn transition_history(
        &self,
        viewer: UserId,
        task_id: TaskId,
    ) -> TaskServiceResult<Vec<StatusTransition>> {
        let caller = self.context.caller(viewer).await?;
        let task = self.context.task(task_id).await?;
        if !caller.can(Capability::ViewAll) && !self.is_assignee(&task, viewer).await? {
            caller.require(Capability::ViewAll)?;
        }
        Ok(self.context.store().list_transitions(task_id).await?)
    }

    async fn transition_along(
        &self,
        actor: UserId,
        task_id: TaskId,
        kind: TransitionKind,
        comment: Option<&str>,
    ) -> TaskServiceResult<Task> {
        let (_, target) = kind.edge();
        self.apply_transition(actor, task_id, target, Some(kind), comment)
            .await
    }

    async fn apply_transition(
        &self,
        actor: UserId,
        task_id: TaskId,
        target: TaskStatus,
        expected: Option<TransitionKind>,
        comment: Option<&str>,
    ) -> TaskServiceResult<Task> {
        let caller = self.context.caller(actor).await?;
        let mut task = self.context.task(task_id).await?;
        let from = task.status();
        let off_edge = expected.is_some_and(|kind| from.transition_to(target) != Some(kind));
        if off_edge && !task.is_deleted() {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id,
                from,
                to: target,
                role: caller.role(),
            }
            .into());
        }
        let read_version = task.version();
        let submitted_by = task.review().requested_by;
        let transition_actor = TransitionActor {
            user_id: actor,
            role: caller.role(),
            is_assignee: self.is_assignee(&task, actor).await?,
        };
        let transition =
            task.transition_to(target, transition_actor, comment, self.context.clock())?;

        let mut changes = ChangeSet::new();
        changes
            .update_task(task.clone(), read_version)
            .record_transition(transition.clone());
        if let Some(kind) = notification_for(transition.kind()) {
            let event = task_event(kind, &task, actor)?
                .naming(submitted_by)
                .with_detail(review_detail(&transition));
            changes.insert_notifications(self.context.plan(&event).await?);
        }
        self.commit_transition(changes, &transition).await?;
        Ok(task)
    }

    async fn is_assignee(&self, task: &Task, user_id: UserId) -> TaskServiceResult<bool> {
        Ok(self.context.assignees(task.id()).await?.contains(&user_id))
    }

    async fn commit_transition(
        &self,
        changes: ChangeSet,
        transition: &StatusTransition,
    ) -> TaskServiceResult<()> {
        match self.context.commit(changes).await {
            Ok(receipt) => {
                info!(
                    task_id = %transition.task_id(),
                    from = %transition.from(),
                    to = %transition.to(),
                    actor = %transition.actor(),
                    notifications = receipt.notifications_inserted,
                    "task transitioned"
                );
                Ok(())
            }
            Err(err) => {
                if let TaskServiceError::Store(StoreError::StaleTask { task_id, .. }) = &err {
                    warn!(%task_id, "task transition lost a concurrent update");
                }
                Err(err)
            }
        }
    }
}

const fn notification_for(kind: TransitionKind) -> Option<NotificationKind> {
    match kind {
        TransitionKind::Start => None,
        TransitionKind::SubmitForReview => Some(NotificationKind::ReviewRequested),
        TransitionKind::Approve | TransitionKind::RequestChanges | TransitionKind::Reopen => {
            Some(NotificationKind::ReviewCompleted)
        }
    }
}

fn review_detail(transition: &StatusTransition) -> String {
    let outcome = match transition.kind() {
        TransitionKind::Approve => "approved the work",
        TransitionKind::RequestChanges => "requested changes",
        TransitionKind::Reopen => "reopened the task",
        TransitionKind::Start | TransitionKind::SubmitForReview => return String::new(),
    };
    transition.comment().map_or_else(
        || outcome.to_owned(),
        |comment| format!("{outcome}: {comment}"),
    )
}
