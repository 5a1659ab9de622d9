//! Recipient resolution and rendering for notification events.

use super::{NotificationError, NotificationResult};
use crate::identity::domain::{Role, UserId};
use crate::identity::ports::IdentityDirectory;
use crate::notification::domain::{Audience, Notification, NotificationEvent, Subject, render};
use crate::notification::ports::RecipientDirectory;
use crate::task::domain::{Assignment, Task, effective_assignees};
use crate::task::ports::TaskStore;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

const UNKNOWN_ACTOR: &str = "Someone";

/// Turns one event into one unread row per recipient.
///
/// Planning only reads; the caller stages the rows into the same change set
/// as the state change that raised the event.
#[derive(Clone)]
pub struct FanoutEngine<S>
where
    S: IdentityDirectory + RecipientDirectory + TaskStore,
{
    store: Arc<S>,
}

impl<S> FanoutEngine<S>
where
    S: IdentityDirectory + RecipientDirectory + TaskStore,
{
    /// Creates a fanout engine over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Resolves the recipients of `event`.
    ///
    /// The actor is never a recipient and tombstoned users are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::SubjectNotFound`] or
    /// [`NotificationError::SubjectDeleted`] when an assignee-based rule
    /// targets a missing or tombstoned task, or a store error.
    pub async fn recipients(
        &self,
        event: &NotificationEvent,
    ) -> NotificationResult<BTreeSet<UserId>> {
        let mut candidates = match event.kind().audience() {
            Audience::Named => event.named().clone(),
            Audience::Administrators => self.administrators().await?,
            Audience::AssigneesAndNamed => {
                let (task, rows) = self.task_assignments(event.subject()).await?;
                let mut users = task
                    .map_or_else(BTreeSet::new, |found| effective_assignees(&found, &rows));
                users.extend(event.named());
                users
            }
            Audience::AssigneesAndAdministrators => {
                let (_, rows) = self.task_assignments(event.subject()).await?;
                let mut users: BTreeSet<UserId> = rows.iter().map(Assignment::user_id).collect();
                users.extend(self.administrators().await?);
                users
            }
            Audience::Everyone => self.store.active_users().await?,
            Audience::ProjectMembers => match event.subject() {
                Subject::Project(project_id) => self.store.project_members(project_id).await?,
                _ => BTreeSet::new(),
            },
        };
        candidates.remove(&event.actor());
        Ok(self.store.retain_active(&candidates).await?)
    }

    /// Plans the rows `event` produces, stamped with `created_at`.
    ///
    /// # Errors
    ///
    /// Returns a recipient resolution error or
    /// [`NotificationError::Domain`] when rendering fails.
    pub async fn plan(
        &self,
        event: &NotificationEvent,
        created_at: DateTime<Utc>,
    ) -> NotificationResult<Vec<Notification>> {
        let recipients = self.recipients(event).await?;
        if recipients.is_empty() {
            debug!(kind = %event.kind(), subject = %event.subject(), "event has no recipients");
            return Ok(Vec::new());
        }
        let actor_name = self
            .store
            .find_profile_unfiltered(event.actor())
            .await?
            .map_or_else(
                || UNKNOWN_ACTOR.to_owned(),
                |profile| profile.display_name().to_owned(),
            );
        let rendered = render(event, &actor_name)?;
        debug!(
            kind = %event.kind(),
            subject = %event.subject(),
            recipients = recipients.len(),
            "planned notification fanout"
        );
        Ok(recipients
            .into_iter()
            .map(|recipient| {
                Notification::for_recipient(event, recipient, rendered.clone(), created_at)
            })
            .collect())
    }

    async fn administrators(&self) -> NotificationResult<BTreeSet<UserId>> {
        Ok(self.store.active_users_with_roles(&Role::ADMINISTRATORS).await?)
    }

    /// Loads a live task subject with its assignment rows.
    ///
    /// Non-task subjects have no assignees.
    async fn task_assignments(
        &self,
        subject: Subject,
    ) -> NotificationResult<(Option<Task>, Vec<Assignment>)> {
        let Subject::Task(task_id) = subject else {
            return Ok((None, Vec::new()));
        };
        let task = self
            .store
            .find_task(task_id)
            .await?
            .ok_or(NotificationError::SubjectNotFound(subject))?;
        if task.is_deleted() {
            return Err(NotificationError::SubjectDeleted(subject));
        }
        let assignments = self.store.list_assignments(task_id).await?;
        Ok((Some(task), assignments))
    }
}
