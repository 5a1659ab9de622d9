//! Inbox reads.

use crate::identity::domain::UserId;
use crate::notification::domain::{Notification, NotificationId};
use crate::persistence::StoreResult;
use async_trait::async_trait;

/// Notification read contract.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Finds a notification by identifier.
    async fn find_notification(&self, id: NotificationId) -> StoreResult<Option<Notification>>;

    /// Returns a recipient's notifications, newest first.
    async fn list_for_recipient(
        &self,
        recipient: UserId,
        unread_only: bool,
    ) -> StoreResult<Vec<Notification>>;

    /// Counts a recipient's unread notifications.
    async fn count_unread(&self, recipient: UserId) -> StoreResult<usize>;
}
