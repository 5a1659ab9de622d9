//! Read-port implementations for [`InMemoryStore`].

use async_trait::async_trait;
use std::collections::BTreeSet;

use super::InMemoryStore;
use crate::identity::domain::{Role, UserId, UserProfile};
use crate::identity::ports::IdentityDirectory;
use crate::notification::domain::{Notification, NotificationId};
use crate::notification::ports::{NotificationStore, RecipientDirectory};
use crate::persistence::StoreResult;
use crate::task::domain::{
    Assignment, EditRequest, EditRequestId, ProjectId, StatusTransition, Task, TaskId,
};
use crate::task::ports::TaskStore;

#[async_trait]
impl IdentityDirectory for InMemoryStore {
    async fn find_profile_unfiltered(&self, id: UserId) -> StoreResult<Option<UserProfile>> {
        let state = self.read()?;
        Ok(state.profiles.get(&id).cloned())
    }

    async fn find_profile_by_email(&self, email: &str) -> StoreResult<Option<UserProfile>> {
        let state = self.read()?;
        let normalized = email.trim().to_ascii_lowercase();
        Ok(state
            .emails
            .get(&normalized)
            .and_then(|id| state.profiles.get(id))
            .cloned())
    }

    async fn list_profiles(&self) -> StoreResult<Vec<UserProfile>> {
        let state = self.read()?;
        let mut profiles: Vec<UserProfile> = state.profiles.values().cloned().collect();
        profiles.sort_by_key(|profile| (profile.created_at(), profile.id()));
        Ok(profiles)
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_active_tasks(&self) -> StoreResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| !task.is_deleted())
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.created_at(), task.id()));
        Ok(tasks)
    }

    async fn list_assignments(&self, task_id: TaskId) -> StoreResult<Vec<Assignment>> {
        let state = self.read()?;
        let mut rows: Vec<Assignment> = state
            .assignments
            .values()
            .filter(|row| row.task_id() == task_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.assigned_at(), row.user_id()));
        Ok(rows)
    }

    async fn list_assignments_for_user(&self, user_id: UserId) -> StoreResult<Vec<Assignment>> {
        let state = self.read()?;
        let mut rows: Vec<Assignment> = state
            .assignments
            .values()
            .filter(|row| row.user_id() == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.assigned_at(), row.task_id()));
        Ok(rows)
    }

    async fn find_edit_request(&self, id: EditRequestId) -> StoreResult<Option<EditRequest>> {
        let state = self.read()?;
        Ok(state.edit_requests.get(&id).cloned())
    }

    async fn find_pending_edit_request(
        &self,
        task_id: TaskId,
    ) -> StoreResult<Option<EditRequest>> {
        let state = self.read()?;
        Ok(state
            .edit_requests
            .values()
            .find(|request| request.task_id() == task_id && request.is_pending())
            .cloned())
    }

    async fn list_edit_requests(&self, task_id: TaskId) -> StoreResult<Vec<EditRequest>> {
        let state = self.read()?;
        let mut requests: Vec<EditRequest> = state
            .edit_requests
            .values()
            .filter(|request| request.task_id() == task_id)
            .cloned()
            .collect();
        requests.sort_by_key(|request| (request.created_at(), request.id()));
        Ok(requests)
    }

    async fn list_pending_edit_requests_by(
        &self,
        requester: UserId,
    ) -> StoreResult<Vec<EditRequest>> {
        let state = self.read()?;
        let mut requests: Vec<EditRequest> = state
            .edit_requests
            .values()
            .filter(|request| request.requester() == requester && request.is_pending())
            .cloned()
            .collect();
        requests.sort_by_key(|request| (request.created_at(), request.id()));
        Ok(requests)
    }

    async fn list_transitions(&self, task_id: TaskId) -> StoreResult<Vec<StatusTransition>> {
        let state = self.read()?;
        Ok(state
            .transitions
            .iter()
            .filter(|transition| transition.task_id() == task_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RecipientDirectory for InMemoryStore {
    async fn active_users(&self) -> StoreResult<BTreeSet<UserId>> {
        let state = self.read()?;
        Ok(state
            .profiles
            .values()
            .filter(|profile| profile.is_active())
            .map(UserProfile::id)
            .collect())
    }

    async fn active_users_with_roles(&self, roles: &[Role]) -> StoreResult<BTreeSet<UserId>> {
        let state = self.read()?;
        Ok(state
            .profiles
            .values()
            .filter(|profile| profile.is_active() && roles.contains(&profile.role()))
            .map(UserProfile::id)
            .collect())
    }

    async fn project_members(&self, project_id: ProjectId) -> StoreResult<BTreeSet<UserId>> {
        let state = self.read()?;
        Ok(state
            .project_members
            .iter()
            .filter(|(project, _)| *project == project_id)
            .map(|(_, user_id)| *user_id)
            .filter(|user_id| {
                state
                    .profiles
                    .get(user_id)
                    .is_some_and(UserProfile::is_active)
            })
            .collect())
    }

    async fn retain_active(&self, candidates: &BTreeSet<UserId>) -> StoreResult<BTreeSet<UserId>> {
        let state = self.read()?;
        Ok(candidates
            .iter()
            .copied()
            .filter(|user_id| {
                state
                    .profiles
                    .get(user_id)
                    .is_some_and(UserProfile::is_active)
            })
            .collect())
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn find_notification(&self, id: NotificationId) -> StoreResult<Option<Notification>> {
        let state = self.read()?;
        Ok(state.notifications.get(&id).cloned())
    }

    async fn list_for_recipient(
        &self,
        recipient: UserId,
        unread_only: bool,
    ) -> StoreResult<Vec<Notification>> {
        let state = self.read()?;
        let mut rows: Vec<Notification> = state
            .notifications
            .values()
            .filter(|row| row.recipient() == recipient && !(unread_only && row.is_read()))
            .cloned()
            .collect();
        rows.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| right.id().cmp(&left.id()))
        });
        Ok(rows)
    }

    async fn count_unread(&self, recipient: UserId) -> StoreResult<usize> {
        let state = self.read()?;
        Ok(state
            .notifications
            .values()
            .filter(|row| row.recipient() == recipient && !row.is_read())
            .count())
    }
}
