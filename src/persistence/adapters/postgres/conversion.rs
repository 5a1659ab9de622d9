//! Conversions between domain values and Diesel rows.

use super::models::{
    AssignmentRow, EditRequestRow, NotificationRow, ProfileRow, TaskRow, TransitionRow,
};
use crate::identity::domain::{PersistedProfileData, Role, UserId, UserProfile};
use crate::notification::domain::{
    Notification, NotificationId, NotificationKind, PersistedNotificationData, Subject,
};
use crate::persistence::{StoreError, StoreResult};
use crate::task::domain::{
    ArchiveMetadata, Assignment, ClosedReason, EditRequest, EditRequestId, EditRequestOrigin,
    EditRequestStatus, PersistedEditRequestData, PersistedTaskData, Priority, ProjectId,
    ReviewMetadata, StatusTransition, Task, TaskId, TaskStatus, Tombstone, TransitionId,
    TransitionKind,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// A stored row violates a shape the schema cannot express.
#[derive(Debug, Error)]
#[error("corrupt {table} row {id}: {reason}")]
pub(super) struct CorruptRow {
    table: &'static str,
    id: Uuid,
    reason: &'static str,
}

pub(super) fn to_db_version(version: u64) -> StoreResult<i64> {
    i64::try_from(version).map_err(StoreError::persistence)
}

pub(super) fn to_db_count(count: usize) -> StoreResult<i64> {
    i64::try_from(count).map_err(StoreError::persistence)
}

pub(super) fn profile_to_row(profile: &UserProfile) -> ProfileRow {
    ProfileRow {
        id: profile.id().into_inner(),
        display_name: profile.display_name().to_owned(),
        email: profile.email().to_owned(),
        role: profile.role().as_str().to_owned(),
        created_at: profile.created_at(),
        deleted_at: profile.deleted_at(),
        deleted_by: profile.deleted_by().map(UserId::into_inner),
    }
}

pub(super) fn row_to_profile(row: ProfileRow) -> StoreResult<UserProfile> {
    let role = Role::try_from(row.role.as_str()).map_err(StoreError::persistence)?;
    Ok(UserProfile::from_persisted(PersistedProfileData {
        id: UserId::from_uuid(row.id),
        display_name: row.display_name,
        email: row.email,
        role,
        created_at: row.created_at,
        deleted_at: row.deleted_at,
        deleted_by: row.deleted_by.map(UserId::from_uuid),
    }))
}

pub(super) fn task_to_row(task: &Task) -> StoreResult<TaskRow> {
    let review = task.review();
    let archive = task.archive();
    let tombstone = task.tombstone();
    Ok(TaskRow {
        id: task.id().into_inner(),
        project_id: task.project_id().map(ProjectId::into_inner),
        title: task.title().to_owned(),
        description: task.description().map(str::to_owned),
        due_date: task.due_date(),
        priority: task.priority().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        review_requested_by: review.requested_by.map(UserId::into_inner),
        review_requested_at: review.requested_at,
        reviewed_by: review.reviewed_by.map(UserId::into_inner),
        reviewed_at: review.reviewed_at,
        review_comments: review.comments.clone(),
        archived_at: archive.map(|stamp| stamp.archived_at),
        archived_by: archive.map(|stamp| stamp.archived_by.into_inner()),
        closed_reason: archive.map(|stamp| stamp.reason.as_str().to_owned()),
        deleted_at: tombstone.map(|stone| stone.deleted_at),
        deleted_by: tombstone.map(|stone| stone.deleted_by.into_inner()),
        legacy_assignee_id: task.legacy_assignee().map(UserId::into_inner),
        created_by: task.created_by().into_inner(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        version: to_db_version(task.version())?,
    })
}

pub(super) fn row_to_task(row: TaskRow) -> StoreResult<Task> {
    let corrupt = |reason: &'static str| {
        StoreError::persistence(CorruptRow {
            table: "tasks",
            id: row.id,
            reason,
        })
    };
    let archive = match (row.archived_at, row.archived_by, row.closed_reason.as_deref()) {
        (Some(archived_at), Some(archived_by), Some(reason)) => Some(ArchiveMetadata {
            archived_at,
            archived_by: UserId::from_uuid(archived_by),
            reason: ClosedReason::try_from(reason).map_err(StoreError::persistence)?,
        }),
        (None, None, None) => None,
        _ => return Err(corrupt("partial archive metadata")),
    };
    let tombstone = tombstone_from(row.deleted_at, row.deleted_by)
        .ok_or_else(|| corrupt("tombstone without actor"))?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        project_id: row.project_id.map(ProjectId::from_uuid),
        title: row.title,
        description: row.description,
        due_date: row.due_date,
        priority: Priority::try_from(row.priority.as_str()).map_err(StoreError::persistence)?,
        status: TaskStatus::try_from(row.status.as_str()).map_err(StoreError::persistence)?,
        review: ReviewMetadata {
            requested_by: row.review_requested_by.map(UserId::from_uuid),
            requested_at: row.review_requested_at,
            reviewed_by: row.reviewed_by.map(UserId::from_uuid),
            reviewed_at: row.reviewed_at,
            comments: row.review_comments,
        },
        archive,
        tombstone,
        legacy_assignee: row.legacy_assignee_id.map(UserId::from_uuid),
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
        version: u64::try_from(row.version).map_err(StoreError::persistence)?,
    }))
}

/// Returns `None` for an inconsistent pair and `Some(None)` for no tombstone.
fn tombstone_from(
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<Uuid>,
) -> Option<Option<Tombstone>> {
    match (deleted_at, deleted_by) {
        (Some(at), Some(by)) => Some(Some(Tombstone {
            deleted_at: at,
            deleted_by: UserId::from_uuid(by),
        })),
        (None, _) => Some(None),
        (Some(_), None) => None,
    }
}

pub(super) fn assignment_to_row(assignment: &Assignment) -> AssignmentRow {
    AssignmentRow {
        task_id: assignment.task_id().into_inner(),
        user_id: assignment.user_id().into_inner(),
        assigned_at: assignment.assigned_at(),
        assigned_by: assignment.assigned_by().into_inner(),
    }
}

pub(super) fn row_to_assignment(row: AssignmentRow) -> Assignment {
    Assignment::from_persisted(
        TaskId::from_uuid(row.task_id),
        UserId::from_uuid(row.user_id),
        row.assigned_at,
        UserId::from_uuid(row.assigned_by),
    )
}

pub(super) fn edit_request_to_row(request: &EditRequest) -> StoreResult<EditRequestRow> {
    Ok(EditRequestRow {
        id: request.id().into_inner(),
        task_id: request.task_id().into_inner(),
        requester_id: request.requester().into_inner(),
        proposed_changes: serde_json::to_value(request.proposed())
            .map_err(StoreError::persistence)?,
        status: request.status().as_str().to_owned(),
        origin: request.origin().as_str().to_owned(),
        reviewer_id: request.reviewer().map(UserId::into_inner),
        reviewed_at: request.reviewed_at(),
        comments: request.comments().map(str::to_owned),
        created_at: request.created_at(),
    })
}

pub(super) fn row_to_edit_request(row: EditRequestRow) -> StoreResult<EditRequest> {
    Ok(EditRequest::from_persisted(PersistedEditRequestData {
        id: EditRequestId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        requester: UserId::from_uuid(row.requester_id),
        proposed: serde_json::from_value(row.proposed_changes)
            .map_err(StoreError::persistence)?,
        status: EditRequestStatus::try_from(row.status.as_str())
            .map_err(StoreError::persistence)?,
        origin: EditRequestOrigin::try_from(row.origin.as_str())
            .map_err(StoreError::persistence)?,
        reviewer: row.reviewer_id.map(UserId::from_uuid),
        reviewed_at: row.reviewed_at,
        comments: row.comments,
        created_at: row.created_at,
    }))
}

pub(super) fn transition_to_row(transition: &StatusTransition) -> TransitionRow {
    TransitionRow {
        id: transition.id().into_inner(),
        task_id: transition.task_id().into_inner(),
        kind: transition.kind().as_str().to_owned(),
        from_status: transition.from().as_str().to_owned(),
        to_status: transition.to().as_str().to_owned(),
        actor_id: transition.actor().into_inner(),
        comment: transition.comment().map(str::to_owned),
        occurred_at: transition.occurred_at(),
    }
}

pub(super) fn row_to_transition(row: TransitionRow) -> StoreResult<StatusTransition> {
    let kind = TransitionKind::try_from(row.kind.as_str()).map_err(StoreError::persistence)?;
    Ok(StatusTransition::from_persisted(
        TransitionId::from_uuid(row.id),
        TaskId::from_uuid(row.task_id),
        kind,
        UserId::from_uuid(row.actor_id),
        row.comment,
        row.occurred_at,
    ))
}

pub(super) fn notification_to_row(notification: &Notification) -> NotificationRow {
    let subject = notification.subject();
    NotificationRow {
        id: notification.id().into_inner(),
        recipient_id: notification.recipient().into_inner(),
        kind: notification.kind().as_str().to_owned(),
        entity_type: subject.kind().as_str().to_owned(),
        entity_id: subject.entity_id(),
        title: notification.title().to_owned(),
        message: notification.message().to_owned(),
        dedup_key: notification.dedup_key().to_owned(),
        is_read: notification.is_read(),
        created_at: notification.created_at(),
        read_at: notification.read_at(),
    }
}

pub(super) fn row_to_notification(row: NotificationRow) -> StoreResult<Notification> {
    let kind = NotificationKind::try_from(row.kind.as_str()).map_err(StoreError::persistence)?;
    let subject =
        Subject::from_parts(&row.entity_type, row.entity_id).map_err(StoreError::persistence)?;
    Ok(Notification::from_persisted(PersistedNotificationData {
        id: NotificationId::from_uuid(row.id),
        recipient: UserId::from_uuid(row.recipient_id),
        kind,
        subject,
        title: row.title,
        message: row.message,
        dedup_key: row.dedup_key,
        created_at: row.created_at,
        read_at: row.read_at,
    }))
}
