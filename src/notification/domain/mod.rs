//! Domain model for notification fanout.
//!
//! An event names a kind, a subject, and an actor; each kind carries one
//! recipient rule. Rows are keyed for deduplication so that replaying an
//! event is harmless.

mod error;
mod event;
mod ids;
mod kind;
mod notification;
mod subject;
mod template;

pub use error::{NotificationDomainError, ParseNotificationValueError};
pub use event::NotificationEvent;
pub use ids::{BulletinId, EventId, NotificationId};
pub use kind::{Audience, NotificationKind, SubjectKind};
pub use notification::{Notification, PersistedNotificationData, dedup_key};
pub use subject::Subject;
pub use template::{RenderedMessage, render};
