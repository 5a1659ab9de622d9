//! The authenticated caller as seen by authorization checks.

use super::{AccessDenied, Capability, CapabilitySet, Role, UserId, UserProfile};

/// A resolved caller: an active profile's identity, role, and capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    id: UserId,
    role: Role,
    capabilities: CapabilitySet,
}

impl Caller {
    /// Builds a caller from an active profile.
    #[must_use]
    pub const fn from_profile(profile: &UserProfile) -> Self {
        Self {
            id: profile.id(),
            role: profile.role(),
            capabilities: profile.role().capabilities(),
        }
    }

    /// Returns the caller identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the caller role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the capability set.
    #[must_use]
    pub const fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    /// Returns whether the caller holds `capability`.
    #[must_use]
    pub const fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Checks that the caller holds `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] when it does not.
    pub const fn require(&self, capability: Capability) -> Result<(), AccessDenied> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(AccessDenied {
                user_id: self.id,
                role: self.role,
                capability,
            })
        }
    }
}
