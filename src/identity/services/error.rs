//! Errors shared by identity services.

use crate::error::ErrorKind;
use crate::identity::domain::{AccessDenied, IdentityDomainError, UserId};
use crate::persistence::StoreError;
use thiserror::Error;

/// Service-level errors for identity operations.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] IdentityDomainError),

    /// The caller lacks a required capability.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// The caller has no active profile.
    #[error("no active profile for caller {0}")]
    CallerNotFound(UserId),

    /// The target profile does not exist.
    #[error("user profile not found: {0}")]
    ProfileNotFound(UserId),

    /// Another profile already uses the email address.
    #[error("email address already registered: {0}")]
    EmailTaken(String),

    /// Bootstrap was attempted after the first profile exists.
    #[error("identity directory is already bootstrapped")]
    AlreadyBootstrapped,

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IdentityError {
    /// Returns the stable classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(err) => err.kind(),
            Self::AccessDenied(_) | Self::AlreadyBootstrapped => ErrorKind::Forbidden,
            Self::CallerNotFound(_) | Self::ProfileNotFound(_) => ErrorKind::NotFound,
            Self::EmailTaken(_) => ErrorKind::ValidationFailed,
            Self::Store(err) => err.kind(),
        }
    }
}

/// Result type for identity service operations.
pub type IdentityResult<T> = Result<T, IdentityError>;
