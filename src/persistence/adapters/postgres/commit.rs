//! Transactional application of change sets.

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

use super::PostgresStore;
use super::conversion::{
    assignment_to_row, edit_request_to_row, notification_to_row, profile_to_row, task_to_row,
    to_db_version, transition_to_row,
};
use super::models::ProjectMemberRow;
use super::schema::{
    edit_requests, notifications, project_members, status_transitions, task_assignments, tasks,
    user_profiles,
};
use crate::identity::domain::{UserId, UserProfile};
use crate::notification::domain::NotificationId;
use crate::persistence::{
    Change, ChangeSet, ChangeSetCommitter, CommitReceipt, StoreError, StoreResult,
};
use crate::task::domain::{Assignment, AssignmentKey, EditRequest, Task};
use chrono::{DateTime, Utc};

#[async_trait]
impl ChangeSetCommitter for PostgresStore {
    async fn commit(&self, changes: ChangeSet) -> StoreResult<CommitReceipt> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, StoreError, _>(|tx| {
                let mut receipt = CommitReceipt::default();
                for change in changes.into_changes() {
                    apply_change(tx, change, &mut receipt)?;
                }
                Ok(receipt)
            })
        })
        .await
    }
}

fn apply_change(
    connection: &mut PgConnection,
    change: Change,
    receipt: &mut CommitReceipt,
) -> StoreResult<()> {
    match change {
        Change::InsertProfile(profile) => insert_profile(connection, &profile),
        Change::UpdateProfile(profile) => update_profile(connection, &profile),
        Change::InsertTask(task) => insert_task(connection, &task),
        Change::UpdateTask { task, read_version } => update_task(connection, &task, read_version),
        Change::InsertAssignment(assignment) => {
            receipt.assignments_inserted += insert_assignment(connection, &assignment)?;
            Ok(())
        }
        Change::RemoveAssignment(key) => {
            receipt.assignments_removed += remove_assignment(connection, key)?;
            Ok(())
        }
        Change::AddProjectMember {
            project_id,
            user_id,
        } => {
            let row = ProjectMemberRow {
                project_id: project_id.into_inner(),
                user_id: user_id.into_inner(),
            };
            diesel::insert_into(project_members::table)
                .values(&row)
                .on_conflict((project_members::project_id, project_members::user_id))
                .do_nothing()
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        StoreError::ProfileNotFound(user_id)
                    }
                    other => StoreError::persistence(other),
                })?;
            Ok(())
        }
        Change::RemoveProjectMember {
            project_id,
            user_id,
        } => {
            diesel::delete(
                project_members::table
                    .filter(project_members::project_id.eq(project_id.into_inner()))
                    .filter(project_members::user_id.eq(user_id.into_inner())),
            )
            .execute(connection)?;
            Ok(())
        }
        Change::InsertEditRequest(request) => insert_edit_request(connection, &request),
        Change::ResolveEditRequest(request) => resolve_edit_request(connection, &request),
        Change::RecordTransition(transition) => {
            diesel::insert_into(status_transitions::table)
                .values(&transition_to_row(&transition))
                .execute(connection)?;
            Ok(())
        }
        Change::InsertNotification(notification) => {
            let row = notification_to_row(&notification);
            let inserted = diesel::insert_into(notifications::table)
                .values(&row)
                .on_conflict(notifications::dedup_key)
                .do_nothing()
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        StoreError::ProfileNotFound(notification.recipient())
                    }
                    other => StoreError::persistence(other),
                })?;
            receipt.notifications_inserted += inserted;
            Ok(())
        }
        Change::MarkNotificationRead { id, read_at } => {
            receipt.notifications_marked_read += mark_read(connection, id, read_at)?;
            Ok(())
        }
    }
}

fn constraint_is(info: &dyn DatabaseErrorInformation, name: &str) -> bool {
    info.constraint_name()
        .is_some_and(|constraint| constraint == name)
}

fn insert_profile(connection: &mut PgConnection, profile: &UserProfile) -> StoreResult<()> {
    diesel::insert_into(user_profiles::table)
        .values(&profile_to_row(profile))
        .execute(connection)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                if constraint_is(info.as_ref(), "idx_user_profiles_email_unique") =>
            {
                StoreError::DuplicateEmail(profile.email().to_owned())
            }
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                StoreError::DuplicateUser(profile.id())
            }
            other => StoreError::persistence(other),
        })?;
    Ok(())
}

fn update_profile(connection: &mut PgConnection, profile: &UserProfile) -> StoreResult<()> {
    let updated = diesel::update(user_profiles::table.find(profile.id().into_inner()))
        .set(&profile_to_row(profile))
        .execute(connection)?;
    if updated == 0 {
        return Err(StoreError::ProfileNotFound(profile.id()));
    }
    Ok(())
}

fn insert_task(connection: &mut PgConnection, task: &Task) -> StoreResult<()> {
    diesel::insert_into(tasks::table)
        .values(&task_to_row(task)?)
        .execute(connection)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                StoreError::DuplicateTask(task.id())
            }
            other => StoreError::persistence(other),
        })?;
    Ok(())
}

fn update_task(connection: &mut PgConnection, task: &Task, read_version: u64) -> StoreResult<()> {
    let id = task.id().into_inner();
    let updated = diesel::update(
        tasks::table
            .filter(tasks::id.eq(id))
            .filter(tasks::version.eq(to_db_version(read_version)?)),
    )
    .set(&task_to_row(task)?)
    .execute(connection)?;
    if updated > 0 {
        return reject_tombstone_with_pending_request(connection, task);
    }

    let stored_version = tasks::table
        .find(id)
        .select(tasks::version)
        .first::<i64>(connection)
        .optional()?;
    let actual = stored_version.ok_or(StoreError::TaskNotFound(task.id()))?;
    Err(StoreError::StaleTask {
        task_id: task.id(),
        expected: read_version,
        actual: u64::try_from(actual).map_err(StoreError::persistence)?,
    })
}

/// Runs after the versioned update, so the task row is locked against a
/// concurrent request insert.
fn reject_tombstone_with_pending_request(
    connection: &mut PgConnection,
    task: &Task,
) -> StoreResult<()> {
    if !task.is_deleted() {
        return Ok(());
    }
    let pending = diesel::select(diesel::dsl::exists(
        edit_requests::table
            .filter(edit_requests::task_id.eq(task.id().into_inner()))
            .filter(edit_requests::status.eq("pending")),
    ))
    .get_result::<bool>(connection)?;
    if pending {
        return Err(StoreError::TaskHasPendingEditRequest(task.id()));
    }
    Ok(())
}

fn insert_assignment(
    connection: &mut PgConnection,
    assignment: &Assignment,
) -> StoreResult<usize> {
    diesel::insert_into(task_assignments::table)
        .values(&assignment_to_row(assignment))
        .on_conflict((task_assignments::task_id, task_assignments::user_id))
        .do_nothing()
        .execute(connection)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, ref info)
                if constraint_is(info.as_ref(), "task_assignments_task_id_fkey") =>
            {
                StoreError::TaskNotFound(assignment.task_id())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                StoreError::ProfileNotFound(assignment.user_id())
            }
            other => StoreError::persistence(other),
        })
}

fn remove_assignment(connection: &mut PgConnection, key: AssignmentKey) -> StoreResult<usize> {
    let removed = diesel::delete(
        task_assignments::table
            .filter(task_assignments::task_id.eq(key.task_id.into_inner()))
            .filter(task_assignments::user_id.eq(key.user_id.into_inner())),
    )
    .execute(connection)?;
    Ok(removed)
}

fn insert_edit_request(connection: &mut PgConnection, request: &EditRequest) -> StoreResult<()> {
    let tombstone = tasks::table
        .find(request.task_id().into_inner())
        .select(tasks::deleted_at)
        .for_update()
        .first::<Option<DateTime<Utc>>>(connection)
        .optional()?;
    let Some(deleted_at) = tombstone else {
        return Err(StoreError::TaskNotFound(request.task_id()));
    };
    if deleted_at.is_some() {
        return Err(StoreError::TaskDeleted(request.task_id()));
    }

    diesel::insert_into(edit_requests::table)
        .values(&edit_request_to_row(request)?)
        .execute(connection)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                if constraint_is(info.as_ref(), "idx_edit_requests_one_pending_per_task") =>
            {
                StoreError::PendingEditRequestExists(request.task_id())
            }
            other => StoreError::persistence(other),
        })?;
    Ok(())
}

fn resolve_edit_request(connection: &mut PgConnection, request: &EditRequest) -> StoreResult<()> {
    let id = request.id().into_inner();
    let updated = diesel::update(
        edit_requests::table
            .filter(edit_requests::id.eq(id))
            .filter(edit_requests::status.eq("pending")),
    )
    .set((
        edit_requests::status.eq(request.status().as_str()),
        edit_requests::reviewer_id.eq(request.reviewer().map(UserId::into_inner)),
        edit_requests::reviewed_at.eq(request.reviewed_at()),
        edit_requests::comments.eq(request.comments()),
    ))
    .execute(connection)?;
    if updated > 0 {
        return Ok(());
    }

    let exists = diesel::select(diesel::dsl::exists(
        edit_requests::table.filter(edit_requests::id.eq(id)),
    ))
    .get_result::<bool>(connection)?;
    if exists {
        Err(StoreError::EditRequestAlreadyResolved(request.id()))
    } else {
        Err(StoreError::EditRequestNotFound(request.id()))
    }
}

fn mark_read(
    connection: &mut PgConnection,
    id: NotificationId,
    read_at: DateTime<Utc>,
) -> StoreResult<usize> {
    let uuid = id.into_inner();
    let updated = diesel::update(
        notifications::table
            .filter(notifications::id.eq(uuid))
            .filter(notifications::is_read.eq(false)),
    )
    .set((
        notifications::is_read.eq(true),
        notifications::read_at.eq(Some(read_at)),
    ))
    .execute(connection)?;
    if updated > 0 {
        return Ok(updated);
    }

    let exists = diesel::select(diesel::dsl::exists(
        notifications::table.filter(notifications::id.eq(uuid)),
    ))
    .get_result::<bool>(connection)?;
    if exists {
        Ok(0)
    } else {
        Err(StoreError::NotificationNotFound(id))
    }
}
