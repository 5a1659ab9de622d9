//! Read port for tasks, assignments, edit requests, and transition history.

use crate::identity::domain::UserId;
use crate::persistence::StoreResult;
use crate::task::domain::{Assignment, EditRequest, EditRequestId, StatusTransition, Task, TaskId};
use async_trait::async_trait;

/// Task read contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Finds a task by identifier, including tombstoned tasks.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>>;

    /// Returns every task without a tombstone, oldest first.
    async fn list_active_tasks(&self) -> StoreResult<Vec<Task>>;

    /// Returns the assignment rows of a task, earliest first.
    async fn list_assignments(&self, task_id: TaskId) -> StoreResult<Vec<Assignment>>;

    /// Returns every assignment row naming the user, earliest first.
    async fn list_assignments_for_user(&self, user_id: UserId) -> StoreResult<Vec<Assignment>>;

    /// Finds an edit request by identifier.
    async fn find_edit_request(&self, id: EditRequestId) -> StoreResult<Option<EditRequest>>;

    /// Returns the unresolved edit request of a task, if any.
    async fn find_pending_edit_request(
        &self,
        task_id: TaskId,
    ) -> StoreResult<Option<EditRequest>>;

    /// Returns every edit request of a task, oldest first.
    async fn list_edit_requests(&self, task_id: TaskId) -> StoreResult<Vec<EditRequest>>;

    /// Returns the unresolved edit requests authored by a user.
    async fn list_pending_edit_requests_by(
        &self,
        requester: UserId,
    ) -> StoreResult<Vec<EditRequest>>;

    /// Returns the transition history of a task, oldest first.
    async fn list_transitions(&self, task_id: TaskId) -> StoreResult<Vec<StatusTransition>>;
}
