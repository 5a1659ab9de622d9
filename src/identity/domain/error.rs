//! Error types for identity validation and parsing.

use super::{Capability, Role, UserId};
use crate::error::ErrorKind;
use thiserror::Error;

/// Errors returned while constructing identity values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityDomainError {
    /// The display name is empty after trimming.
    #[error("display name must not be empty")]
    EmptyDisplayName,

    /// The email address is not plausibly formed.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// The profile is tombstoned.
    #[error("user profile {0} has been deleted")]
    ProfileDeleted(UserId),

    /// A restore targeted a profile that is still active.
    #[error("user profile {0} is not deleted")]
    ProfileNotDeleted(UserId),
}

impl IdentityDomainError {
    /// Returns the stable classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyDisplayName | Self::InvalidEmail(_) => ErrorKind::ValidationFailed,
            Self::ProfileDeleted(_) => ErrorKind::RecordDeleted,
            Self::ProfileNotDeleted(_) => ErrorKind::NotDeleted,
        }
    }
}

/// Error returned while parsing roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// A caller lacks a capability an operation requires.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("user {user_id} with role {role} lacks the {capability} capability")]
pub struct AccessDenied {
    /// Rejected caller.
    pub user_id: UserId,
    /// Caller role.
    pub role: Role,
    /// Missing capability.
    pub capability: Capability,
}
