//! Notifiable events raised by the engine and by external subsystems.

use super::{EventId, NotificationDomainError, NotificationKind, Subject};
use crate::identity::domain::UserId;
use std::collections::BTreeSet;

/// One occurrence of something recipients should hear about.
///
/// The occurrence identifier, kind, and subject together with a recipient
/// determine the deduplication key of each fanned-out row, so replaying the
/// same event never yields extra rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    occurrence: EventId,
    kind: NotificationKind,
    subject: Subject,
    actor: UserId,
    named: BTreeSet<UserId>,
    label: String,
    detail: Option<String>,
}

impl NotificationEvent {
    /// Creates an event with a fresh occurrence identifier.
    ///
    /// `label` is the human-readable name of the subject, such as a task
    /// title, used when rendering messages.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationDomainError::SubjectMismatch`] when `subject`
    /// is not the entity kind `kind` is raised against.
    pub fn new(
        kind: NotificationKind,
        subject: Subject,
        actor: UserId,
        label: impl Into<String>,
    ) -> Result<Self, NotificationDomainError> {
        let expected = kind.subject_kind();
        if subject.kind() != expected {
            return Err(NotificationDomainError::SubjectMismatch {
                kind,
                expected,
                actual: subject.kind(),
            });
        }
        Ok(Self {
            occurrence: EventId::new(),
            kind,
            subject,
            actor,
            named: BTreeSet::new(),
            label: label.into(),
            detail: None,
        })
    }

    /// Pins the occurrence identifier, for callers that retry delivery.
    #[must_use]
    pub const fn with_occurrence(mut self, occurrence: EventId) -> Self {
        self.occurrence = occurrence;
        self
    }

    /// Names users that the kind's recipient rule addresses directly.
    #[must_use]
    pub fn naming(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.named.extend(users);
        self
    }

    /// Attaches free-text detail rendered into the message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let text = detail.into();
        self.detail = (!text.trim().is_empty()).then_some(text);
        self
    }

    /// Returns the occurrence identifier.
    #[must_use]
    pub const fn occurrence(&self) -> EventId {
        self.occurrence
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Returns the subject.
    #[must_use]
    pub const fn subject(&self) -> Subject {
        self.subject
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn actor(&self) -> UserId {
        self.actor
    }

    /// Returns the users named on the event.
    #[must_use]
    pub const fn named(&self) -> &BTreeSet<UserId> {
        &self.named
    }

    /// Returns the subject label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the free-text detail.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}
