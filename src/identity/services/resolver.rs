//! Caller resolution for every authorization check in the engine.

use super::{IdentityError, IdentityResult};
use crate::identity::domain::{Caller, CapabilitySet, UserId, UserProfile};
use crate::identity::ports::IdentityDirectory;
use std::sync::Arc;

/// Resolves a caller identifier to its role and capabilities.
///
/// Reads go through [`IdentityDirectory::find_profile_unfiltered`] only, so
/// resolution never recurses through a visibility rule.
#[derive(Clone)]
pub struct RoleResolver<D>
where
    D: IdentityDirectory,
{
    directory: Arc<D>,
}

impl<D> RoleResolver<D>
where
    D: IdentityDirectory,
{
    /// Creates a resolver over `directory`.
    #[must_use]
    pub const fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// Resolves an active caller.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::CallerNotFound`] when no profile exists or
    /// the profile is tombstoned, or [`IdentityError::Store`] when the
    /// lookup fails.
    pub async fn resolve(&self, caller_id: UserId) -> IdentityResult<Caller> {
        let profile = self
            .directory
            .find_profile_unfiltered(caller_id)
            .await?
            .filter(UserProfile::is_active)
            .ok_or(IdentityError::CallerNotFound(caller_id))?;
        Ok(Caller::from_profile(&profile))
    }

    /// Resolves only the capability set of an active caller.
    ///
    /// # Errors
    ///
    /// Same as [`RoleResolver::resolve`].
    pub async fn capabilities(&self, caller_id: UserId) -> IdentityResult<CapabilitySet> {
        Ok(self.resolve(caller_id).await?.capabilities())
    }
}
