//! Per-recipient notification rows.

use super::{
    EventId, NotificationEvent, NotificationId, NotificationKind, RenderedMessage, Subject,
};
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One delivery record for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    recipient: UserId,
    kind: NotificationKind,
    subject: Subject,
    title: String,
    message: String,
    dedup_key: String,
    created_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedNotificationData {
    /// Persisted identifier.
    pub id: NotificationId,
    /// Persisted recipient.
    pub recipient: UserId,
    /// Persisted kind.
    pub kind: NotificationKind,
    /// Persisted related entity.
    pub subject: Subject,
    /// Persisted title.
    pub title: String,
    /// Persisted message.
    pub message: String,
    /// Persisted deduplication key.
    pub dedup_key: String,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted read timestamp.
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Creates the unread row `event` produces for `recipient`.
    #[must_use]
    pub fn for_recipient(
        event: &NotificationEvent,
        recipient: UserId,
        rendered: RenderedMessage,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            recipient,
            kind: event.kind(),
            subject: event.subject(),
            title: rendered.title,
            message: rendered.message,
            dedup_key: dedup_key(event.occurrence(), event.kind(), event.subject(), recipient),
            created_at,
            read_at: None,
        }
    }

    /// Reconstructs a notification from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedNotificationData) -> Self {
        Self {
            id: data.id,
            recipient: data.recipient,
            kind: data.kind,
            subject: data.subject,
            title: data.title,
            message: data.message,
            dedup_key: data.dedup_key,
            created_at: data.created_at,
            read_at: data.read_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the recipient.
    #[must_use]
    pub const fn recipient(&self) -> UserId {
        self.recipient
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Returns the related entity.
    #[must_use]
    pub const fn subject(&self) -> Subject {
        self.subject
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the message body.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the deduplication key.
    #[must_use]
    pub fn dedup_key(&self) -> &str {
        &self.dedup_key
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the recipient read the notification.
    #[must_use]
    pub const fn read_at(&self) -> Option<DateTime<Utc>> {
        self.read_at
    }

    /// Returns whether the recipient has read the notification.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// Stamps the read time once; later calls keep the first stamp.
    ///
    /// Returns whether the row changed.
    pub const fn mark_read(&mut self, at: DateTime<Utc>) -> bool {
        if self.read_at.is_some() {
            return false;
        }
        self.read_at = Some(at);
        true
    }
}

/// Computes the deduplication key for one (occurrence, kind, subject,
/// recipient) tuple as lowercase hex SHA-256.
#[must_use]
pub fn dedup_key(
    occurrence: EventId,
    kind: NotificationKind,
    subject: Subject,
    recipient: UserId,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(occurrence.into_inner().as_bytes());
    hasher.update(kind.as_str().as_bytes());
    hasher.update(subject.kind().as_str().as_bytes());
    hasher.update(subject.entity_id().as_bytes());
    hasher.update(recipient.into_inner().as_bytes());
    hasher
        .finalize()
        .iter()
        .flat_map(|byte| [byte >> 4, byte & 0x0f])
        .filter_map(|nibble| char::from_digit(u32::from(nibble), 16))
        .collect()
}
