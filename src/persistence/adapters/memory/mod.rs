//! In-memory store for engine tests and embedded use.
//!
//! A commit stages every change on a copy of the state and swaps it in only
//! when all of them succeed, which gives the same all-or-nothing behaviour
//! as a database transaction.

mod reads;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::identity::domain::{UserId, UserProfile};
use crate::notification::domain::{Notification, NotificationId};
use crate::persistence::{
    Change, ChangeSet, ChangeSetCommitter, CommitReceipt, PurgeBatch, Purger, StoreError,
    StoreResult,
};
use crate::task::domain::{
    Assignment, AssignmentKey, EditRequest, EditRequestId, ProjectId, StatusTransition, Task,
    TaskId,
};

/// Thread-safe in-memory store implementing every engine port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    profiles: HashMap<UserId, UserProfile>,
    emails: HashMap<String, UserId>,
    tasks: HashMap<TaskId, Task>,
    assignments: BTreeMap<AssignmentKey, Assignment>,
    project_members: BTreeSet<(ProjectId, UserId)>,
    edit_requests: HashMap<EditRequestId, EditRequest>,
    transitions: Vec<StatusTransition>,
    notifications: HashMap<NotificationId, Notification>,
    dedup_keys: HashSet<String>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

impl StoreState {
    fn apply(&mut self, change: Change, receipt: &mut CommitReceipt) -> StoreResult<()> {
        match change {
            Change::InsertProfile(profile) => self.insert_profile(profile),
            Change::UpdateProfile(profile) => {
                let stored = self
                    .profiles
                    .get_mut(&profile.id())
                    .ok_or(StoreError::ProfileNotFound(profile.id()))?;
                *stored = profile;
                Ok(())
            }
            Change::InsertTask(task) => {
                if self.tasks.contains_key(&task.id()) {
                    return Err(StoreError::DuplicateTask(task.id()));
                }
                self.tasks.insert(task.id(), task);
                Ok(())
            }
            Change::UpdateTask { task, read_version } => self.update_task(task, read_version),
            Change::InsertAssignment(assignment) => {
                self.insert_assignment(assignment, receipt)
            }
            Change::RemoveAssignment(key) => {
                if self.assignments.remove(&key).is_some() {
                    receipt.assignments_removed += 1;
                }
                Ok(())
            }
            Change::AddProjectMember {
                project_id,
                user_id,
            } => {
                self.require_profile(user_id)?;
                self.project_members.insert((project_id, user_id));
                Ok(())
            }
            Change::RemoveProjectMember {
                project_id,
                user_id,
            } => {
                self.project_members.remove(&(project_id, user_id));
                Ok(())
            }
            Change::InsertEditRequest(request) => self.insert_edit_request(request),
            Change::ResolveEditRequest(request) => {
                let stored = self
                    .edit_requests
                    .get_mut(&request.id())
                    .ok_or(StoreError::EditRequestNotFound(request.id()))?;
                if !stored.is_pending() {
                    return Err(StoreError::EditRequestAlreadyResolved(request.id()));
                }
                *stored = request;
                Ok(())
            }
            Change::RecordTransition(transition) => {
                self.require_task(transition.task_id())?;
                self.transitions.push(transition);
                Ok(())
            }
            Change::InsertNotification(notification) => {
                if self.dedup_keys.insert(notification.dedup_key().to_owned()) {
                    self.notifications.insert(notification.id(), notification);
                    receipt.notifications_inserted += 1;
                }
                Ok(())
            }
            Change::MarkNotificationRead { id, read_at } => {
                let stored = self
                    .notifications
                    .get_mut(&id)
                    .ok_or(StoreError::NotificationNotFound(id))?;
                if stored.mark_read(read_at) {
                    receipt.notifications_marked_read += 1;
                }
                Ok(())
            }
        }
    }

    fn insert_profile(&mut self, profile: UserProfile) -> StoreResult<()> {
        if self.profiles.contains_key(&profile.id()) {
            return Err(StoreError::DuplicateUser(profile.id()));
        }
        if self.emails.contains_key(profile.email()) {
            return Err(StoreError::DuplicateEmail(profile.email().to_owned()));
        }
        self.emails.insert(profile.email().to_owned(), profile.id());
        self.profiles.insert(profile.id(), profile);
        Ok(())
    }

    fn update_task(&mut self, task: Task, read_version: u64) -> StoreResult<()> {
        let stored = self
            .tasks
            .get_mut(&task.id())
            .ok_or(StoreError::TaskNotFound(task.id()))?;
        if stored.version() != read_version {
            return Err(StoreError::StaleTask {
                task_id: task.id(),
                expected: read_version,
                actual: stored.version(),
            });
        }
        let blocked = task.is_deleted()
            && self
                .edit_requests
                .values()
                .any(|request| request.task_id() == task.id() && request.is_pending());
        if blocked {
            return Err(StoreError::TaskHasPendingEditRequest(task.id()));
        }
        *stored = task;
        Ok(())
    }

    fn insert_assignment(
        &mut self,
        assignment: Assignment,
        receipt: &mut CommitReceipt,
    ) -> StoreResult<()> {
        self.require_task(assignment.task_id())?;
        self.require_profile(assignment.user_id())?;
        if let Entry::Vacant(slot) = self.assignments.entry(assignment.key()) {
            slot.insert(assignment);
            receipt.assignments_inserted += 1;
        }
        Ok(())
    }

    fn insert_edit_request(&mut self, request: EditRequest) -> StoreResult<()> {
        let task = self
            .tasks
            .get(&request.task_id())
            .ok_or(StoreError::TaskNotFound(request.task_id()))?;
        if task.is_deleted() {
            return Err(StoreError::TaskDeleted(request.task_id()));
        }
        let conflicting = request.is_pending()
            && self
                .edit_requests
                .values()
                .any(|existing| existing.task_id() == request.task_id() && existing.is_pending());
        if conflicting {
            return Err(StoreError::PendingEditRequestExists(request.task_id()));
        }
        self.edit_requests.insert(request.id(), request);
        Ok(())
    }

    fn require_task(&self, task_id: TaskId) -> StoreResult<()> {
        if self.tasks.contains_key(&task_id) {
            Ok(())
        } else {
            Err(StoreError::TaskNotFound(task_id))
        }
    }

    fn require_profile(&self, user_id: UserId) -> StoreResult<()> {
        if self.profiles.contains_key(&user_id) {
            Ok(())
        } else {
            Err(StoreError::ProfileNotFound(user_id))
        }
    }

    fn purge(&mut self, cutoff: DateTime<Utc>, limit: usize) -> PurgeBatch {
        let mut expired_tasks: Vec<(DateTime<Utc>, TaskId)> = self
            .tasks
            .values()
            .filter_map(|task| task.tombstone().map(|stone| (stone.deleted_at, task.id())))
            .filter(|(deleted_at, _)| *deleted_at < cutoff)
            .collect();
        expired_tasks.sort_unstable();
        expired_tasks.truncate(limit);

        let mut expired_users: Vec<(DateTime<Utc>, UserId)> = self
            .profiles
            .values()
            .filter_map(|profile| profile.deleted_at().map(|at| (at, profile.id())))
            .filter(|(deleted_at, _)| *deleted_at < cutoff)
            .collect();
        expired_users.sort_unstable();
        expired_users.truncate(limit);

        let task_ids: HashSet<TaskId> = expired_tasks.into_iter().map(|(_, id)| id).collect();
        let user_ids: HashSet<UserId> = expired_users.into_iter().map(|(_, id)| id).collect();

        let assignments_before = self.assignments.len();
        self.assignments.retain(|key, _| {
            !task_ids.contains(&key.task_id) && !user_ids.contains(&key.user_id)
        });
        let notifications_before = self.notifications.len();
        let dedup_keys = &mut self.dedup_keys;
        self.notifications.retain(|_, notification| {
            let keep = !user_ids.contains(&notification.recipient());
            if !keep {
                dedup_keys.remove(notification.dedup_key());
            }
            keep
        });
        self.project_members
            .retain(|(_, user_id)| !user_ids.contains(user_id));
        self.tasks.retain(|id, _| !task_ids.contains(id));
        self.emails.retain(|_, id| !user_ids.contains(id));
        self.profiles.retain(|id, _| !user_ids.contains(id));

        PurgeBatch {
            tasks: task_ids.len(),
            users: user_ids.len(),
            assignments: assignments_before - self.assignments.len(),
            notifications: notifications_before - self.notifications.len(),
        }
    }
}

#[async_trait]
impl ChangeSetCommitter for InMemoryStore {
    async fn commit(&self, changes: ChangeSet) -> StoreResult<CommitReceipt> {
        let mut state = self.write()?;
        let mut staged = state.clone();
        let mut receipt = CommitReceipt::default();
        for change in changes.into_changes() {
            staged.apply(change, &mut receipt)?;
        }
        *state = staged;
        Ok(receipt)
    }
}

#[async_trait]
impl Purger for InMemoryStore {
    async fn purge_batch(&self, cutoff: DateTime<Utc>, limit: usize) -> StoreResult<PurgeBatch> {
        let mut state = self.write()?;
        Ok(state.purge(cutoff, limit))
    }
}
