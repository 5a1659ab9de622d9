//! Notification kinds and the recipient rule each one follows.

use super::ParseNotificationValueError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed enumeration of notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A user was added to a task.
    TaskAssigned,
    /// An assignee submitted a task for review.
    ReviewRequested,
    /// A review or edit request was resolved.
    ReviewCompleted,
    /// A comment was posted on a task.
    CommentAdded,
    /// A document was attached to a task.
    DocumentUploaded,
    /// A note was added to a task.
    NoteAdded,
    /// A checklist item on a task was completed.
    TodoCompleted,
    /// An organization-wide bulletin was posted.
    BulletinPosted,
    /// Project details changed.
    ProjectUpdated,
    /// A project was closed.
    ProjectClosed,
    /// A project was reopened.
    ProjectReopened,
}

/// Recipient rule applied by the fanout engine.
///
/// The actor and inactive users are always removed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    /// Only the users named on the event.
    Named,
    /// Every administrator.
    Administrators,
    /// Effective assignees plus the users named on the event.
    AssigneesAndNamed,
    /// Effective assignees plus every administrator.
    AssigneesAndAdministrators,
    /// Every active user.
    Everyone,
    /// Members of the subject project.
    ProjectMembers,
}

/// Which kind of entity a notification kind must be raised against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    /// A task.
    Task,
    /// A project.
    Project,
    /// A bulletin.
    Bulletin,
}

impl SubjectKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Project => "project",
            Self::Bulletin => "bulletin",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NotificationKind {
    /// Every kind.
    pub const ALL: [Self; 11] = [
        Self::TaskAssigned,
        Self::ReviewRequested,
        Self::ReviewCompleted,
        Self::CommentAdded,
        Self::DocumentUploaded,
        Self::NoteAdded,
        Self::TodoCompleted,
        Self::BulletinPosted,
        Self::ProjectUpdated,
        Self::ProjectClosed,
        Self::ProjectReopened,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskAssigned => "task_assigned",
            Self::ReviewRequested => "review_requested",
            Self::ReviewCompleted => "review_completed",
            Self::CommentAdded => "comment_added",
            Self::DocumentUploaded => "document_uploaded",
            Self::NoteAdded => "note_added",
            Self::TodoCompleted => "todo_completed",
            Self::BulletinPosted => "bulletin_posted",
            Self::ProjectUpdated => "project_updated",
            Self::ProjectClosed => "project_closed",
            Self::ProjectReopened => "project_reopened",
        }
    }

    /// Returns the recipient rule for this kind.
    #[must_use]
    pub const fn audience(self) -> Audience {
        match self {
            Self::TaskAssigned => Audience::Named,
            Self::ReviewRequested => Audience::Administrators,
            Self::ReviewCompleted => Audience::AssigneesAndNamed,
            Self::CommentAdded | Self::DocumentUploaded | Self::NoteAdded | Self::TodoCompleted => {
                Audience::AssigneesAndAdministrators
            }
            Self::BulletinPosted => Audience::Everyone,
            Self::ProjectUpdated | Self::ProjectClosed | Self::ProjectReopened => {
                Audience::ProjectMembers
            }
        }
    }

    /// Returns the entity kind events of this kind are raised against.
    #[must_use]
    pub const fn subject_kind(self) -> SubjectKind {
        match self {
            Self::BulletinPosted => SubjectKind::Bulletin,
            Self::ProjectUpdated | Self::ProjectClosed | Self::ProjectReopened => {
                SubjectKind::Project
            }
            _ => SubjectKind::Task,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = ParseNotificationValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseNotificationValueError::new("kind", value))
    }
}
