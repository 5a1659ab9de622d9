//! Read-port implementations for [`PostgresStore`].

use async_trait::async_trait;
use diesel::prelude::*;
use std::collections::BTreeSet;

use super::PostgresStore;
use super::conversion::{
    row_to_assignment, row_to_edit_request, row_to_notification, row_to_profile, row_to_task,
    row_to_transition,
};
use super::models::{
    AssignmentRow, EditRequestRow, NotificationRow, ProfileRow, TaskRow, TransitionRow,
};
use super::schema::{
    edit_requests, notifications, project_members, status_transitions, task_assignments, tasks,
    user_profiles,
};
use crate::identity::domain::{Role, UserId, UserProfile};
use crate::identity::ports::IdentityDirectory;
use crate::notification::domain::{Notification, NotificationId};
use crate::notification::ports::{NotificationStore, RecipientDirectory};
use crate::persistence::{StoreError, StoreResult};
use crate::task::domain::{
    Assignment, EditRequest, EditRequestId, ProjectId, StatusTransition, Task, TaskId,
};
use crate::task::ports::TaskStore;

#[async_trait]
impl IdentityDirectory for PostgresStore {
    async fn find_profile_unfiltered(&self, id: UserId) -> StoreResult<Option<UserProfile>> {
        self.run_blocking(move |connection| {
            let row = user_profiles::table
                .find(id.into_inner())
                .select(ProfileRow::as_select())
                .first::<ProfileRow>(connection)
                .optional()?;
            row.map(row_to_profile).transpose()
        })
        .await
    }

    async fn find_profile_by_email(&self, email: &str) -> StoreResult<Option<UserProfile>> {
        let normalized = email.trim().to_ascii_lowercase();
        self.run_blocking(move |connection| {
            let row = user_profiles::table
                .filter(user_profiles::email.eq(normalized))
                .select(ProfileRow::as_select())
                .first::<ProfileRow>(connection)
                .optional()?;
            row.map(row_to_profile).transpose()
        })
        .await
    }

    async fn list_profiles(&self) -> StoreResult<Vec<UserProfile>> {
        self.run_blocking(move |connection| {
            user_profiles::table
                .order((user_profiles::created_at.asc(), user_profiles::id.asc()))
                .select(ProfileRow::as_select())
                .load::<ProfileRow>(connection)?
                .into_iter()
                .map(row_to_profile)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl TaskStore for PostgresStore {
    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_active_tasks(&self) -> StoreResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            tasks::table
                .filter(tasks::deleted_at.is_null())
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn list_assignments(&self, task_id: TaskId) -> StoreResult<Vec<Assignment>> {
        self.run_blocking(move |connection| {
            let rows = task_assignments::table
                .filter(task_assignments::task_id.eq(task_id.into_inner()))
                .order((
                    task_assignments::assigned_at.asc(),
                    task_assignments::user_id.asc(),
                ))
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)?;
            Ok(rows.into_iter().map(row_to_assignment).collect())
        })
        .await
    }

    async fn list_assignments_for_user(&self, user_id: UserId) -> StoreResult<Vec<Assignment>> {
        self.run_blocking(move |connection| {
            let rows = task_assignments::table
                .filter(task_assignments::user_id.eq(user_id.into_inner()))
                .order((
                    task_assignments::assigned_at.asc(),
                    task_assignments::task_id.asc(),
                ))
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)?;
            Ok(rows.into_iter().map(row_to_assignment).collect())
        })
        .await
    }

    async fn find_edit_request(&self, id: EditRequestId) -> StoreResult<Option<EditRequest>> {
        self.run_blocking(move |connection| {
            let row = edit_requests::table
                .find(id.into_inner())
                .select(EditRequestRow::as_select())
                .first::<EditRequestRow>(connection)
                .optional()?;
            row.map(row_to_edit_request).transpose()
        })
        .await
    }

    async fn find_pending_edit_request(
        &self,
        task_id: TaskId,
    ) -> StoreResult<Option<EditRequest>> {
        self.run_blocking(move |connection| {
            let row = edit_requests::table
                .filter(edit_requests::task_id.eq(task_id.into_inner()))
                .filter(edit_requests::status.eq("pending"))
                .select(EditRequestRow::as_select())
                .first::<EditRequestRow>(connection)
                .optional()?;
            row.map(row_to_edit_request).transpose()
        })
        .await
    }

    async fn list_edit_requests(&self, task_id: TaskId) -> StoreResult<Vec<EditRequest>> {
        self.run_blocking(move |connection| {
            edit_requests::table
                .filter(edit_requests::task_id.eq(task_id.into_inner()))
                .order((edit_requests::created_at.asc(), edit_requests::id.asc()))
                .select(EditRequestRow::as_select())
                .load::<EditRequestRow>(connection)?
                .into_iter()
                .map(row_to_edit_request)
                .collect()
        })
        .await
    }

    async fn list_pending_edit_requests_by(
        &self,
        requester: UserId,
    ) -> StoreResult<Vec<EditRequest>> {
        self.run_blocking(move |connection| {
            edit_requests::table
                .filter(edit_requests::requester_id.eq(requester.into_inner()))
                .filter(edit_requests::status.eq("pending"))
                .order((edit_requests::created_at.asc(), edit_requests::id.asc()))
                .select(EditRequestRow::as_select())
                .load::<EditRequestRow>(connection)?
                .into_iter()
                .map(row_to_edit_request)
                .collect()
        })
        .await
    }

    async fn list_transitions(&self, task_id: TaskId) -> StoreResult<Vec<StatusTransition>> {
        self.run_blocking(move |connection| {
            status_transitions::table
                .filter(status_transitions::task_id.eq(task_id.into_inner()))
                .order((
                    status_transitions::occurred_at.asc(),
                    status_transitions::id.asc(),
                ))
                .select(TransitionRow::as_select())
                .load::<TransitionRow>(connection)?
                .into_iter()
                .map(row_to_transition)
                .collect()
        })
        .await
    }
}

fn to_user_ids(ids: Vec<uuid::Uuid>) -> BTreeSet<UserId> {
    ids.into_iter().map(UserId::from_uuid).collect()
}

#[async_trait]
impl RecipientDirectory for PostgresStore {
    async fn active_users(&self) -> StoreResult<BTreeSet<UserId>> {
        self.run_blocking(move |connection| {
            let ids = user_profiles::table
                .filter(user_profiles::deleted_at.is_null())
                .select(user_profiles::id)
                .load::<uuid::Uuid>(connection)?;
            Ok(to_user_ids(ids))
        })
        .await
    }

    async fn active_users_with_roles(&self, roles: &[Role]) -> StoreResult<BTreeSet<UserId>> {
        let role_names: Vec<&'static str> = roles.iter().copied().map(Role::as_str).collect();
        self.run_blocking(move |connection| {
            let ids = user_profiles::table
                .filter(user_profiles::deleted_at.is_null())
                .filter(user_profiles::role.eq_any(role_names))
                .select(user_profiles::id)
                .load::<uuid::Uuid>(connection)?;
            Ok(to_user_ids(ids))
        })
        .await
    }

    async fn project_members(&self, project_id: ProjectId) -> StoreResult<BTreeSet<UserId>> {
        self.run_blocking(move |connection| {
            let ids = project_members::table
                .inner_join(user_profiles::table)
                .filter(project_members::project_id.eq(project_id.into_inner()))
                .filter(user_profiles::deleted_at.is_null())
                .select(project_members::user_id)
                .load::<uuid::Uuid>(connection)?;
            Ok(to_user_ids(ids))
        })
        .await
    }

    async fn retain_active(&self, candidates: &BTreeSet<UserId>) -> StoreResult<BTreeSet<UserId>> {
        let ids: Vec<uuid::Uuid> = candidates.iter().copied().map(UserId::into_inner).collect();
        self.run_blocking(move |connection| {
            let active = user_profiles::table
                .filter(user_profiles::id.eq_any(ids))
                .filter(user_profiles::deleted_at.is_null())
                .select(user_profiles::id)
                .load::<uuid::Uuid>(connection)?;
            Ok(to_user_ids(active))
        })
        .await
    }
}

#[async_trait]
impl NotificationStore for PostgresStore {
    async fn find_notification(&self, id: NotificationId) -> StoreResult<Option<Notification>> {
        self.run_blocking(move |connection| {
            let row = notifications::table
                .find(id.into_inner())
                .select(NotificationRow::as_select())
                .first::<NotificationRow>(connection)
                .optional()?;
            row.map(row_to_notification).transpose()
        })
        .await
    }

    async fn list_for_recipient(
        &self,
        recipient: UserId,
        unread_only: bool,
    ) -> StoreResult<Vec<Notification>> {
        self.run_blocking(move |connection| {
            let mut query = notifications::table
                .filter(notifications::recipient_id.eq(recipient.into_inner()))
                .into_boxed();
            if unread_only {
                query = query.filter(notifications::is_read.eq(false));
            }
            query
                .order((notifications::created_at.desc(), notifications::id.desc()))
                .select(NotificationRow::as_select())
                .load::<NotificationRow>(connection)?
                .into_iter()
                .map(row_to_notification)
                .collect()
        })
        .await
    }

    async fn count_unread(&self, recipient: UserId) -> StoreResult<usize> {
        self.run_blocking(move |connection| {
            let count = notifications::table
                .filter(notifications::recipient_id.eq(recipient.into_inner()))
                .filter(notifications::is_read.eq(false))
                .count()
                .get_result::<i64>(connection)?;
            usize::try_from(count).map_err(StoreError::persistence)
        })
        .await
    }
}
