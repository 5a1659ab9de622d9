//! Diesel row models for engine persistence.

use super::schema::{
    edit_requests, notifications, project_members, status_transitions, task_assignments, tasks,
    user_profiles,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

/// Profile row, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = user_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct ProfileRow {
    /// Profile identifier.
    pub id: Uuid,
    /// Display name.
    pub display_name: String,
    /// Normalized email.
    pub email: String,
    /// Role.
    pub role: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Tombstone timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Tombstoning actor.
    pub deleted_by: Option<Uuid>,
}

/// Task row, used for reads, inserts, and guarded updates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Owning project.
    pub project_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Priority.
    pub priority: String,
    /// Status.
    pub status: String,
    /// Review requester.
    pub review_requested_by: Option<Uuid>,
    /// Review request timestamp.
    pub review_requested_at: Option<DateTime<Utc>>,
    /// Reviewer.
    pub reviewed_by: Option<Uuid>,
    /// Review timestamp.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Review comments.
    pub review_comments: Option<String>,
    /// Archive timestamp.
    pub archived_at: Option<DateTime<Utc>>,
    /// Archiving actor.
    pub archived_by: Option<Uuid>,
    /// Closed reason.
    pub closed_reason: Option<String>,
    /// Tombstone timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Tombstoning actor.
    pub deleted_by: Option<Uuid>,
    /// Legacy single-assignee pointer.
    pub legacy_assignee_id: Option<Uuid>,
    /// Creator.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency version.
    pub version: i64,
}

/// Assignment row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssignmentRow {
    /// Assigned task.
    pub task_id: Uuid,
    /// Assigned user.
    pub user_id: Uuid,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Assigning actor.
    pub assigned_by: Uuid,
}

/// Project membership row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = project_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectMemberRow {
    /// Project.
    pub project_id: Uuid,
    /// Member.
    pub user_id: Uuid,
}

/// Edit request row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = edit_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EditRequestRow {
    /// Request identifier.
    pub id: Uuid,
    /// Targeted task.
    pub task_id: Uuid,
    /// Requester.
    pub requester_id: Uuid,
    /// Proposed changes JSON payload.
    pub proposed_changes: Value,
    /// Status.
    pub status: String,
    /// Origin.
    pub origin: String,
    /// Reviewer.
    pub reviewer_id: Option<Uuid>,
    /// Resolution timestamp.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer comments.
    pub comments: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Status transition row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = status_transitions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransitionRow {
    /// Record identifier.
    pub id: Uuid,
    /// Task that moved.
    pub task_id: Uuid,
    /// Edge taken.
    pub kind: String,
    /// Status before.
    pub from_status: String,
    /// Status after.
    pub to_status: String,
    /// Acting user.
    pub actor_id: Uuid,
    /// Comment.
    pub comment: Option<String>,
    /// Occurrence timestamp.
    pub occurred_at: DateTime<Utc>,
}

/// Notification row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    /// Notification identifier.
    pub id: Uuid,
    /// Recipient.
    pub recipient_id: Uuid,
    /// Kind.
    pub kind: String,
    /// Related entity type.
    pub entity_type: String,
    /// Related entity identifier.
    pub entity_id: Uuid,
    /// Title.
    pub title: String,
    /// Message body.
    pub message: String,
    /// Deduplication key.
    pub dedup_key: String,
    /// Read flag.
    pub is_read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Read timestamp.
    pub read_at: Option<DateTime<Utc>>,
}
