//! Soft delete, restore, and the scheduled hard purge.

use super::context::ServiceContext;
use super::{DeletionTarget, TaskServiceError, TaskServiceResult};
use crate::identity::domain::{Capability, UserId, UserProfile};
use crate::identity::services::IdentityError;
use crate::persistence::{ChangeSet, EngineStore, PurgeBatch};
use crate::task::domain::{Assignment, Task, TaskId};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// What happened to a deleted user's assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserDeletionReport {
    /// The tombstoned user.
    pub user_id: UserId,
    /// Rows on live tasks moved to the reassignment target.
    pub reassigned: usize,
    /// Rows on live tasks left pointing at the tombstoned user.
    pub orphaned: usize,
}

/// Totals of one purge run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Tasks permanently removed.
    pub tasks: usize,
    /// Profiles permanently removed.
    pub users: usize,
    /// Assignment rows removed with them.
    pub assignments: usize,
    /// Notifications removed with purged recipients.
    pub notifications: usize,
    /// Batches executed, including the final short one.
    pub batches: usize,
}

impl PurgeReport {
    const fn absorb(&mut self, batch: PurgeBatch) {
        self.tasks += batch.tasks;
        self.users += batch.users;
        self.assignments += batch.assignments;
        self.notifications += batch.notifications;
        self.batches += 1;
    }
}

/// Retention orchestration service.
#[derive(Clone)]
pub struct RetentionService<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    context: ServiceContext<S, C>,
}

impl<S, C> RetentionService<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    /// Creates a new retention service.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            context: ServiceContext::new(store, clock),
        }
    }

    /// Tombstones a task.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when `actor` lacks
    /// [`Capability::Delete`], [`TaskServiceError::HasPendingEditRequests`]
    /// while an edit request is unresolved, a domain error when the task is
    /// already tombstoned, [`TaskServiceError::TaskNotFound`], or a store
    /// error.
    pub async fn soft_delete_task(
        &self,
        actor: UserId,
        task_id: TaskId,
    ) -> TaskServiceResult<Task> {
        self.context.authorize(actor, Capability::Delete).await?;
        let mut task = self.context.task(task_id).await?;
        let read_version = task.version();
        task.tombstone_by(actor, self.context.clock())?;
        if self
            .context
            .store()
            .find_pending_edit_request(task_id)
            .await?
            .is_some()
        {
            return Err(TaskServiceError::HasPendingEditRequests {
                target: DeletionTarget::Task(task_id),
                pending: 1,
            });
        }
        let mut changes = ChangeSet::new();
        changes.update_task(task.clone(), read_version);
        self.context.commit(changes).await?;
        info!(%task_id, %actor, "soft-deleted task");
        Ok(task)
    }

    /// Tombstones a user, optionally moving their assignments to
    /// `reassign_to`.
    ///
    /// Without a target the assignment rows stay and are reported as
    /// orphaned; they drop out of notification fanout because the user is
    /// inactive.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when `actor` lacks
    /// [`Capability::Delete`], [`TaskServiceError::SelfDeletion`],
    /// [`TaskServiceError::HasPendingEditRequests`] while the user has
    /// unresolved requests, [`TaskServiceError::InvalidReassignTarget`], a
    /// not-found or deleted error for the user, or a store error.
    pub async fn soft_delete_user(
        &self,
        actor: UserId,
        user_id: UserId,
        reassign_to: Option<UserId>,
    ) -> TaskServiceResult<UserDeletionReport> {
        self.context.authorize(actor, Capability::Delete).await?;
        if actor == user_id {
            return Err(TaskServiceError::SelfDeletion(user_id));
        }
        let mut profile = self.load_profile(user_id).await?;
        profile
            .tombstone(actor, self.context.clock())
            .map_err(IdentityError::from)?;
        let pending = self
            .context
            .store()
            .list_pending_edit_requests_by(user_id)
            .await?
            .len();
        if pending > 0 {
            return Err(TaskServiceError::HasPendingEditRequests {
                target: DeletionTarget::User(user_id),
                pending,
            });
        }
        if let Some(target) = reassign_to {
            self.check_reassign_target(user_id, target).await?;
        }

        let assignments = self.live_task_assignments(user_id).await?;
        let mut changes = ChangeSet::new();
        changes.update_profile(profile);
        if let Some(target) = reassign_to {
            for assignment in &assignments {
                changes
                    .remove_assignment(assignment.key())
                    .insert_assignment(Assignment::new(
                        assignment.task_id(),
                        target,
                        actor,
                        self.context.clock(),
                    ));
            }
        }
        let moved = if reassign_to.is_some() { assignments.len() } else { 0 };
        let report = UserDeletionReport {
            user_id,
            reassigned: moved,
            orphaned: assignments.len() - moved,
        };
        self.context.commit(changes).await?;
        info!(
            %user_id,
            %actor,
            reassigned = report.reassigned,
            orphaned = report.orphaned,
            "soft-deleted user"
        );
        Ok(report)
    }

    /// Clears a task tombstone.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when `actor` lacks
    /// [`Capability::Restore`], a domain error when the task is not
    /// tombstoned, [`TaskServiceError::TaskNotFound`], or a store error.
    pub async fn restore_task(&self, actor: UserId, task_id: TaskId) -> TaskServiceResult<Task> {
        self.context.authorize(actor, Capability::Restore).await?;
        let mut task = self.context.task(task_id).await?;
        let read_version = task.version();
        task.restore(self.context.clock())?;
        let mut changes = ChangeSet::new();
        changes.update_task(task.clone(), read_version);
        self.context.commit(changes).await?;
        info!(%task_id, %actor, "restored task");
        Ok(task)
    }

    /// Clears a user tombstone. Their assignments are not restored.
    ///
    /// # Errors
    ///
    /// Returns an authorization error when `actor` lacks
    /// [`Capability::Restore`], an identity error when the user is not
    /// tombstoned, [`TaskServiceError::UserNotFound`], or a store error.
    pub async fn restore_user(
        &self,
        actor: UserId,
        user_id: UserId,
    ) -> TaskServiceResult<UserProfile> {
        self.context.authorize(actor, Capability::Restore).await?;
        let mut profile = self.load_profile(user_id).await?;
        profile.restore().map_err(IdentityError::from)?;
        let mut changes = ChangeSet::new();
        changes.update_profile(profile.clone());
        self.context.commit(changes).await?;
        info!(%user_id, %actor, "restored user");
        Ok(profile)
    }

    /// Permanently removes records tombstoned more than `cutoff_days` ago,
    /// in batches of at most `batch_limit` rows per entity.
    ///
    /// Runs until a batch comes back short. Records without a tombstone are
    /// never touched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::InvalidBatchLimit`] for a zero limit or a
    /// store error. Batches committed before a failure stay committed.
    pub async fn purge(
        &self,
        cutoff_days: u32,
        batch_limit: usize,
    ) -> TaskServiceResult<PurgeReport> {
        if batch_limit == 0 {
            return Err(TaskServiceError::InvalidBatchLimit);
        }
        let cutoff = purge_cutoff(self.context.clock().utc(), cutoff_days);
        let mut report = PurgeReport::default();
        loop {
            let batch = self.context.store().purge_batch(cutoff, batch_limit).await?;
            debug!(?batch, "purge batch committed");
            report.absorb(batch);
            if batch.tasks < batch_limit && batch.users < batch_limit {
                break;
            }
        }
        info!(
            %cutoff,
            tasks = report.tasks,
            users = report.users,
            assignments = report.assignments,
            notifications = report.notifications,
            batches = report.batches,
            "purge finished"
        );
        Ok(report)
    }

    /// Returns the user's assignment rows on tasks that are not
    /// tombstoned; rows on tombstoned tasks go with the task at purge.
    async fn live_task_assignments(&self, user_id: UserId) -> TaskServiceResult<Vec<Assignment>> {
        let store = self.context.store();
        let mut live = Vec::new();
        for assignment in store.list_assignments_for_user(user_id).await? {
            let task = store.find_task(assignment.task_id()).await?;
            if task.is_some_and(|found| !found.is_deleted()) {
                live.push(assignment);
            }
        }
        Ok(live)
    }

    async fn load_profile(&self, user_id: UserId) -> TaskServiceResult<UserProfile> {
        self.context
            .store()
            .find_profile_unfiltered(user_id)
            .await?
            .ok_or(TaskServiceError::UserNotFound(user_id))
    }

    async fn check_reassign_target(
        &self,
        user_id: UserId,
        target: UserId,
    ) -> TaskServiceResult<()> {
        let invalid = TaskServiceError::InvalidReassignTarget { user_id, target };
        if target == user_id {
            return Err(invalid);
        }
        match self.context.active_profile(target).await {
            Ok(_) => Ok(()),
            Err(TaskServiceError::UserNotFound(_) | TaskServiceError::UserDeleted(_)) => {
                Err(invalid)
            }
            Err(err) => Err(err),
        }
    }
}

fn purge_cutoff(now: DateTime<Utc>, cutoff_days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(TimeDelta::days(i64::from(cutoff_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
