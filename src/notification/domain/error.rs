//! Error types for notification construction and parsing.

use super::{NotificationKind, SubjectKind};
use crate::error::ErrorKind;
use thiserror::Error;

/// Errors returned while building notification events.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationDomainError {
    /// The event subject does not match what the kind requires.
    #[error("{kind} notifications must target a {expected}, not a {actual}")]
    SubjectMismatch {
        /// Kind of the rejected event.
        kind: NotificationKind,
        /// Subject kind the event kind requires.
        expected: SubjectKind,
        /// Subject kind supplied.
        actual: SubjectKind,
    },

    /// A title or message template failed to render.
    #[error("failed to render {kind} template: {reason}")]
    TemplateRender {
        /// Kind whose template failed.
        kind: NotificationKind,
        /// Renderer diagnostic.
        reason: String,
    },
}

impl NotificationDomainError {
    /// Returns the stable classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::SubjectMismatch { .. } => ErrorKind::ValidationFailed,
            Self::TemplateRender { .. } => ErrorKind::Internal,
        }
    }
}

/// Error returned while parsing notification values from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notification {field}: {value}")]
pub struct ParseNotificationValueError {
    field: &'static str,
    value: String,
}

impl ParseNotificationValueError {
    /// Creates a parse error for `field` with the rejected raw value.
    #[must_use]
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}
