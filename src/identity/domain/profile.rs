//! User profile aggregate.

use super::{IdentityDomainError, Role, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A user known to the engine, with the role that drives authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    id: UserId,
    display_name: String,
    email: String,
    role: Role,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<UserId>,
}

/// Parameter object for reconstructing a persisted profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProfileData {
    /// Persisted identifier.
    pub id: UserId,
    /// Persisted display name.
    pub display_name: String,
    /// Persisted email address.
    pub email: String,
    /// Persisted role.
    pub role: Role,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Tombstone timestamp, if deleted.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Actor who tombstoned the profile, if deleted.
    pub deleted_by: Option<UserId>,
}

impl UserProfile {
    /// Creates a new active profile.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::EmptyDisplayName`] for a blank name or
    /// [`IdentityDomainError::InvalidEmail`] when the address lacks a local
    /// part or domain.
    pub fn new(
        display_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        clock: &impl Clock,
    ) -> Result<Self, IdentityDomainError> {
        let name = display_name.into().trim().to_owned();
        if name.is_empty() {
            return Err(IdentityDomainError::EmptyDisplayName);
        }
        let normalized_email = normalize_email(email.into())?;

        Ok(Self {
            id: UserId::new(),
            display_name: name,
            email: normalized_email,
            role,
            created_at: clock.utc(),
            deleted_at: None,
            deleted_by: None,
        })
    }

    /// Reconstructs a profile from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProfileData) -> Self {
        Self {
            id: data.id,
            display_name: data.display_name,
            email: data.email,
            role: data.role,
            created_at: data.created_at,
            deleted_at: data.deleted_at,
            deleted_by: data.deleted_by,
        }
    }

    /// Returns the profile identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the normalized email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the assigned role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the tombstone timestamp, if deleted.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns the actor who tombstoned the profile, if deleted.
    #[must_use]
    pub const fn deleted_by(&self) -> Option<UserId> {
        self.deleted_by
    }

    /// Returns whether the profile is not tombstoned.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Replaces the role.
    pub const fn change_role(&mut self, role: Role) {
        self.role = role;
    }

    /// Tombstones the profile.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::ProfileDeleted`] when already
    /// tombstoned.
    pub fn tombstone(
        &mut self,
        actor: UserId,
        clock: &impl Clock,
    ) -> Result<(), IdentityDomainError> {
        if self.deleted_at.is_some() {
            return Err(IdentityDomainError::ProfileDeleted(self.id));
        }
        self.deleted_at = Some(clock.utc());
        self.deleted_by = Some(actor);
        Ok(())
    }

    /// Clears the tombstone.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::ProfileNotDeleted`] when the profile is
    /// active.
    pub fn restore(&mut self) -> Result<(), IdentityDomainError> {
        if self.deleted_at.is_none() {
            return Err(IdentityDomainError::ProfileNotDeleted(self.id));
        }
        self.deleted_at = None;
        self.deleted_by = None;
        Ok(())
    }
}

fn normalize_email(raw: String) -> Result<String, IdentityDomainError> {
    let normalized = raw.trim().to_ascii_lowercase();
    let is_valid = normalized
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        })
        && !normalized.chars().any(char::is_whitespace);
    if is_valid {
        Ok(normalized)
    } else {
        Err(IdentityDomainError::InvalidEmail(raw))
    }
}
