//! Event intake and per-recipient inbox operations.

use super::{FanoutEngine, NotificationError, NotificationResult};
use crate::identity::domain::{Capability, UserId};
use crate::identity::services::RoleResolver;
use crate::notification::domain::{
    Notification, NotificationEvent, NotificationId, NotificationKind,
};
use crate::persistence::{ChangeSet, EngineStore};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of delivering one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Recipients the event resolved to.
    pub recipients: usize,
    /// Rows actually written; replays of a delivered event write none.
    pub inserted: usize,
}

/// Notification orchestration service.
#[derive(Clone)]
pub struct NotificationService<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    resolver: RoleResolver<S>,
    fanout: FanoutEngine<S>,
    clock: Arc<C>,
}

impl<S, C> NotificationService<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    /// Creates a new notification service.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            resolver: RoleResolver::new(Arc::clone(&store)),
            fanout: FanoutEngine::new(Arc::clone(&store)),
            store,
            clock,
        }
    }

    /// Delivers an event raised by an external subsystem.
    ///
    /// The actor must be an active user; bulletins additionally need
    /// [`Capability::PostBulletin`]. Delivery is idempotent per event
    /// occurrence.
    ///
    /// # Errors
    ///
    /// Returns a caller resolution or authorization error, a fanout error,
    /// or a store error. Nothing is written on error.
    pub async fn notify(&self, event: &NotificationEvent) -> NotificationResult<FanoutReport> {
        let caller = self.resolver.resolve(event.actor()).await?;
        if event.kind() == NotificationKind::BulletinPosted {
            caller.require(Capability::PostBulletin)?;
        }
        let rows = self.fanout.plan(event, self.clock.utc()).await?;
        let recipients = rows.len();
        if rows.is_empty() {
            return Ok(FanoutReport::default());
        }
        let mut changes = ChangeSet::new();
        changes.insert_notifications(rows);
        let receipt = self.store.commit(changes).await?;
        info!(
            kind = %event.kind(),
            subject = %event.subject(),
            recipients,
            inserted = receipt.notifications_inserted,
            "delivered notification event"
        );
        Ok(FanoutReport {
            recipients,
            inserted: receipt.notifications_inserted,
        })
    }

    /// Lists the viewer's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns a caller resolution or store error.
    pub async fn list_for_recipient(
        &self,
        viewer: UserId,
        unread_only: bool,
    ) -> NotificationResult<Vec<Notification>> {
        self.resolver.resolve(viewer).await?;
        Ok(self.store.list_for_recipient(viewer, unread_only).await?)
    }

    /// Counts the viewer's unread notifications.
    ///
    /// # Errors
    ///
    /// Returns a caller resolution or store error.
    pub async fn unread_count(&self, viewer: UserId) -> NotificationResult<usize> {
        self.resolver.resolve(viewer).await?;
        Ok(self.store.count_unread(viewer).await?)
    }

    /// Marks a notification read on behalf of its recipient.
    ///
    /// Returns `false` when it was already read.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::NotificationNotFound`],
    /// [`NotificationError::NotRecipient`] when `viewer` does not own the
    /// notification, or a store error.
    pub async fn mark_read(
        &self,
        viewer: UserId,
        notification_id: NotificationId,
    ) -> NotificationResult<bool> {
        self.resolver.resolve(viewer).await?;
        let notification = self
            .store
            .find_notification(notification_id)
            .await?
            .ok_or(NotificationError::NotificationNotFound(notification_id))?;
        if notification.recipient() != viewer {
            return Err(NotificationError::NotRecipient {
                notification_id,
                user_id: viewer,
            });
        }
        if notification.is_read() {
            debug!(%notification_id, "notification already read");
            return Ok(false);
        }
        let mut changes = ChangeSet::new();
        changes.mark_notification_read(notification_id, self.clock.utc());
        let receipt = self.store.commit(changes).await?;
        Ok(receipt.notifications_marked_read > 0)
    }
}
