//! Diesel schema for engine persistence.

diesel::table! {
    /// User profiles with their assigned role.
    user_profiles (id) {
        /// Profile identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        display_name -> Varchar,
        /// Normalized email address.
        #[max_length = 320]
        email -> Varchar,
        /// Assigned role.
        #[max_length = 50]
        role -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Tombstone timestamp.
        deleted_at -> Nullable<Timestamptz>,
        /// Tombstoning actor.
        deleted_by -> Nullable<Uuid>,
    }
}

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Nullable<Uuid>,
        /// Title.
        title -> Text,
        /// Description.
        description -> Nullable<Text>,
        /// Due date.
        due_date -> Nullable<Date>,
        /// Priority.
        #[max_length = 20]
        priority -> Varchar,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Assignee who requested review.
        review_requested_by -> Nullable<Uuid>,
        /// When review was requested.
        review_requested_at -> Nullable<Timestamptz>,
        /// Approving reviewer.
        reviewed_by -> Nullable<Uuid>,
        /// When the task was approved.
        reviewed_at -> Nullable<Timestamptz>,
        /// Reviewer comments.
        review_comments -> Nullable<Text>,
        /// Archive timestamp.
        archived_at -> Nullable<Timestamptz>,
        /// Archiving actor.
        archived_by -> Nullable<Uuid>,
        /// Why the task was closed.
        #[max_length = 50]
        closed_reason -> Nullable<Varchar>,
        /// Tombstone timestamp.
        deleted_at -> Nullable<Timestamptz>,
        /// Tombstoning actor.
        deleted_by -> Nullable<Uuid>,
        /// Legacy single-assignee pointer.
        legacy_assignee_id -> Nullable<Uuid>,
        /// Creator.
        created_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Optimistic-concurrency version.
        version -> Int8,
    }
}

diesel::table! {
    /// Task assignment rows.
    task_assignments (task_id, user_id) {
        /// Assigned task.
        task_id -> Uuid,
        /// Assigned user.
        user_id -> Uuid,
        /// Assignment timestamp.
        assigned_at -> Timestamptz,
        /// Assigning actor.
        assigned_by -> Uuid,
    }
}

diesel::table! {
    /// Project rosters used for project notifications.
    project_members (project_id, user_id) {
        /// Project.
        project_id -> Uuid,
        /// Member.
        user_id -> Uuid,
    }
}

diesel::table! {
    /// Edit request audit rows.
    edit_requests (id) {
        /// Request identifier.
        id -> Uuid,
        /// Targeted task.
        task_id -> Uuid,
        /// Requester.
        requester_id -> Uuid,
        /// Sparse proposed changes.
        proposed_changes -> Jsonb,
        /// Resolution status.
        #[max_length = 20]
        status -> Varchar,
        /// Requested or direct.
        #[max_length = 20]
        origin -> Varchar,
        /// Resolving reviewer.
        reviewer_id -> Nullable<Uuid>,
        /// Resolution timestamp.
        reviewed_at -> Nullable<Timestamptz>,
        /// Reviewer comments.
        comments -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Status transition audit rows.
    status_transitions (id) {
        /// Record identifier.
        id -> Uuid,
        /// Task that moved.
        task_id -> Uuid,
        /// Edge taken.
        #[max_length = 50]
        kind -> Varchar,
        /// Status before.
        #[max_length = 50]
        from_status -> Varchar,
        /// Status after.
        #[max_length = 50]
        to_status -> Varchar,
        /// Acting user.
        actor_id -> Uuid,
        /// Optional comment.
        comment -> Nullable<Text>,
        /// When the transition happened.
        occurred_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-recipient notification rows.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// Recipient.
        recipient_id -> Uuid,
        /// Notification kind.
        #[max_length = 50]
        kind -> Varchar,
        /// Related entity type.
        #[max_length = 20]
        entity_type -> Varchar,
        /// Related entity identifier.
        entity_id -> Uuid,
        /// Title.
        title -> Text,
        /// Message body.
        message -> Text,
        /// Deduplication key.
        #[max_length = 64]
        dedup_key -> Varchar,
        /// Read flag.
        is_read -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Read timestamp.
        read_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(task_assignments -> tasks (task_id));
diesel::joinable!(task_assignments -> user_profiles (user_id));
diesel::joinable!(project_members -> user_profiles (user_id));
diesel::joinable!(notifications -> user_profiles (recipient_id));

diesel::allow_tables_to_appear_in_same_query!(
    user_profiles,
    tasks,
    task_assignments,
    project_members,
    edit_requests,
    status_transitions,
    notifications,
);
