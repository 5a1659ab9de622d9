//! The entity a notification relates to.

use super::{BulletinId, ParseNotificationValueError, SubjectKind};
use crate::task::domain::{ProjectId, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Related entity of an event and of every row it fans out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Subject {
    /// A task.
    Task(TaskId),
    /// A project.
    Project(ProjectId),
    /// A bulletin.
    Bulletin(BulletinId),
}

impl Subject {
    /// Returns the entity kind.
    #[must_use]
    pub const fn kind(self) -> SubjectKind {
        match self {
            Self::Task(_) => SubjectKind::Task,
            Self::Project(_) => SubjectKind::Project,
            Self::Bulletin(_) => SubjectKind::Bulletin,
        }
    }

    /// Returns the entity identifier.
    #[must_use]
    pub const fn entity_id(self) -> Uuid {
        match self {
            Self::Task(id) => id.into_inner(),
            Self::Project(id) => id.into_inner(),
            Self::Bulletin(id) => id.into_inner(),
        }
    }

    /// Rebuilds a subject from its stored type tag and identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ParseNotificationValueError`] for an unknown type tag.
    pub fn from_parts(
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<Self, ParseNotificationValueError> {
        match entity_type.trim() {
            "task" => Ok(Self::Task(TaskId::from_uuid(entity_id))),
            "project" => Ok(Self::Project(ProjectId::from_uuid(entity_id))),
            "bulletin" => Ok(Self::Bulletin(BulletinId::from_uuid(entity_id))),
            _ => Err(ParseNotificationValueError::new("subject type", entity_type)),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.entity_id())
    }
}
