//! Recipient lookups used by the fanout engine.

use crate::identity::domain::{Role, UserId};
use crate::persistence::StoreResult;
use crate::task::domain::ProjectId;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Audience lookups. Every method returns active profiles only.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// Returns every active user.
    async fn active_users(&self) -> StoreResult<BTreeSet<UserId>>;

    /// Returns every active user holding one of `roles`.
    async fn active_users_with_roles(&self, roles: &[Role]) -> StoreResult<BTreeSet<UserId>>;

    /// Returns the active members of a project.
    async fn project_members(&self, project_id: ProjectId) -> StoreResult<BTreeSet<UserId>>;

    /// Returns the subset of `candidates` with an active profile.
    async fn retain_active(&self, candidates: &BTreeSet<UserId>) -> StoreResult<BTreeSet<UserId>>;
}
