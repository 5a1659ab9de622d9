//! Service layer for the audited edit-request workflow.
//!
//! Task content never changes in place outside this module: coordinators
//! propose, elevated admins approve or reject, and direct edits leave an
//! approved request behind for audit parity.

use super::context::{ServiceContext, task_event};
use super::{TaskServiceError, TaskServiceResult};
use crate::identity::domain::{Capability, UserId};
use crate::notification::domain::NotificationKind;
use crate::persistence::{ChangeSet, EngineStore};
use crate::task::domain::{
    EditGrant, EditRequest, EditRequestId, ProposedChanges, ReviewDecision, Task, TaskId,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Edit-request orchestration service.
#[derive(Clone)]
pub struct EditRequestService<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    context: ServiceContext<S, C>,
}

impl<S, C> EditRequestService<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    /// Creates a new edit-request service.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            context: ServiceContext::new(store, clock),
        }
    }

    /// Files a pending proposal against a task.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when `requester` lacks
    /// [`Capability::RequestEdit`], a validation error for an empty or
    /// malformed proposal or an inactive proposed assignee,
    /// [`TaskServiceError::PendingRequestExists`] when the task already has
    /// an unresolved request, a not-found or deleted error for the task, or
    /// a store error.
    pub async fn create_edit_request(
        &self,
        requester: UserId,
        task_id: TaskId,
        proposed: ProposedChanges,
    ) -> TaskServiceResult<EditRequest> {
        self.context
            .authorize(requester, Capability::RequestEdit)
            .await?;
        proposed.validate()?;
        self.context.live_task(task_id).await?;
        if let Some(assignees) = proposed.assignees() {
            self.context.ensure_assignable(assignees).await?;
        }
        if self
            .context
            .store()
            .find_pending_edit_request(task_id)
            .await?
            .is_some()
        {
            return Err(TaskServiceError::PendingRequestExists(task_id));
        }

        let request = EditRequest::pending(task_id, requester, proposed, self.context.clock());
        let mut changes = ChangeSet::new();
        changes.insert_edit_request(request.clone());
        self.context.commit(changes).await?;
        info!(request_id = %request.id(), %task_id, %requester, "filed edit request");
        Ok(request)
    }

    /// Approves or rejects a pending request.
    ///
    /// Approval applies the proposal to the task and its assignment rows in
    /// the same commit as the resolution. Either way the requester hears
    /// back.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when `reviewer` lacks
    /// [`Capability::ResolveEditRequest`],
    /// [`TaskServiceError::EditRequestNotFound`], a not-pending domain error
    /// when the request is resolved, or a store error. A lost race against
    /// another reviewer or a task writer writes nothing.
    pub async fn resolve_edit_request(
        &self,
        reviewer: UserId,
        request_id: EditRequestId,
        decision: ReviewDecision,
        comments: Option<String>,
    ) -> TaskServiceResult<EditRequest> {
        self.context
            .authorize(reviewer, Capability::ResolveEditRequest)
            .await?;
        let mut request = self
            .context
            .store()
            .find_edit_request(request_id)
            .await?
            .ok_or(TaskServiceError::EditRequestNotFound(request_id))?;
        request.resolve(reviewer, decision, comments, self.context.clock())?;
        let mut task = self.context.task(request.task_id()).await?;

        let mut changes = ChangeSet::new();
        changes.resolve_edit_request(request.clone());
        if decision == ReviewDecision::Approve {
            self.stage_proposal(&mut task, request.proposed(), reviewer, &mut changes)
                .await?;
        }
        let verdict = match decision {
            ReviewDecision::Approve => "approved the proposed edit",
            ReviewDecision::Reject => "rejected the proposed edit",
        };
        let detail = request.comments().map_or_else(
            || verdict.to_owned(),
            |text| format!("{verdict}: {text}"),
        );
        let event = task_event(NotificationKind::ReviewCompleted, &task, reviewer)?
            .naming([request.requester()])
            .with_detail(detail);
        changes.insert_notifications(self.context.plan(&event).await?);
        self.context.commit(changes).await?;
        info!(
            %request_id,
            task_id = %request.task_id(),
            %reviewer,
            status = %request.status(),
            "resolved edit request"
        );
        Ok(request)
    }

    /// Applies changes immediately, recording an approved request with the
    /// editor as both requester and reviewer.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when `editor` lacks
    /// [`Capability::DirectEdit`], a validation error, a not-found or
    /// deleted error for the task, or a store error.
    pub async fn direct_edit(
        &self,
        editor: UserId,
        task_id: TaskId,
        proposed: ProposedChanges,
        comment: Option<String>,
    ) -> TaskServiceResult<Task> {
        self.context.authorize(editor, Capability::DirectEdit).await?;
        proposed.validate()?;
        let mut task = self.context.live_task(task_id).await?;

        let mut changes = ChangeSet::new();
        self.stage_proposal(&mut task, &proposed, editor, &mut changes)
            .await?;
        let record = EditRequest::direct(task_id, editor, proposed, comment, self.context.clock());
        changes.insert_edit_request(record.clone());
        self.context.commit(changes).await?;
        info!(request_id = %record.id(), %task_id, %editor, "applied direct edit");
        Ok(task)
    }

    /// Lists every request filed against a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when `viewer` lacks
    /// [`Capability::ViewAll`] or a store error.
    pub async fn list_edit_requests(
        &self,
        viewer: UserId,
        task_id: TaskId,
    ) -> TaskServiceResult<Vec<EditRequest>> {
        self.context.authorize(viewer, Capability::ViewAll).await?;
        Ok(self.context.store().list_edit_requests(task_id).await?)
    }

    /// Finds one request.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when `viewer` lacks
    /// [`Capability::ViewAll`], [`TaskServiceError::EditRequestNotFound`],
    /// or a store error.
    pub async fn find_edit_request(
        &self,
        viewer: UserId,
        request_id: EditRequestId,
    ) -> TaskServiceResult<EditRequest> {
        self.context.authorize(viewer, Capability::ViewAll).await?;
        self.context
            .store()
            .find_edit_request(request_id)
            .await?
            .ok_or(TaskServiceError::EditRequestNotFound(request_id))
    }

    /// Applies `proposed` to `task` and stages the task write, the
    /// assignment rows, and the notifications for new assignees.
    ///
    /// The assignee diff compares against assignment rows only.
    async fn stage_proposal(
        &self,
        task: &mut Task,
        proposed: &ProposedChanges,
        actor: UserId,
        changes: &mut ChangeSet,
    ) -> TaskServiceResult<()> {
        let read_version = task.version();
        task.apply_changes(proposed, EditGrant::issue(), self.context.clock())?;
        if task.version() != read_version {
            changes.update_task(task.clone(), read_version);
        }
        let Some(desired) = proposed.assignees() else {
            return Ok(());
        };
        self.context.ensure_assignable(desired).await?;
        let diff = self
            .context
            .stage_assignees(task, desired, actor, changes)
            .await?;
        if !diff.added.is_empty() {
            let event = task_event(NotificationKind::TaskAssigned, task, actor)?
                .naming(diff.added.iter().copied());
            changes.insert_notifications(self.context.plan(&event).await?);
        }
        Ok(())
    }
}
