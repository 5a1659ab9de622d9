//! Unfiltered identity reads.

use crate::identity::domain::{UserId, UserProfile};
use crate::persistence::StoreResult;
use async_trait::async_trait;

/// Read access to the identity table with no visibility filtering.
///
/// Authorization resolves through this port alone, so a permission check
/// never depends on a visibility rule that itself needs a permission check.
/// Display listings apply their filter on top of it in the service layer.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Finds a profile by identifier, including tombstoned profiles.
    async fn find_profile_unfiltered(&self, id: UserId) -> StoreResult<Option<UserProfile>>;

    /// Finds a profile by normalized email address, including tombstoned
    /// profiles.
    async fn find_profile_by_email(&self, email: &str) -> StoreResult<Option<UserProfile>>;

    /// Returns every profile, including tombstoned ones, oldest first.
    async fn list_profiles(&self) -> StoreResult<Vec<UserProfile>>;
}
