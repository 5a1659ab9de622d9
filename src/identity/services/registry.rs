//! Profile registration, role management, and filtered profile listings.

use super::{IdentityError, IdentityResult, RoleResolver};
use crate::identity::domain::{Capability, IdentityDomainError, Role, UserId, UserProfile};
use crate::identity::ports::IdentityDirectory;
use crate::persistence::{ChangeSet, ChangeSetCommitter, StoreError};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Request payload for registering a user profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserRequest {
    display_name: String,
    email: String,
    role: Role,
}

impl RegisterUserRequest {
    /// Creates a registration request.
    #[must_use]
    pub fn new(display_name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
            role,
        }
    }
}

/// Identity orchestration service.
#[derive(Clone)]
pub struct IdentityService<S, C>
where
    S: IdentityDirectory + ChangeSetCommitter,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    resolver: RoleResolver<S>,
    clock: Arc<C>,
}

impl<S, C> IdentityService<S, C>
where
    S: IdentityDirectory + ChangeSetCommitter,
    C: Clock + Send + Sync,
{
    /// Creates a new identity service.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        let resolver = RoleResolver::new(Arc::clone(&store));
        Self {
            store,
            resolver,
            clock,
        }
    }

    /// Returns the resolver used for authorization checks.
    #[must_use]
    pub const fn resolver(&self) -> &RoleResolver<S> {
        &self.resolver
    }

    /// Creates the first profile of an empty directory as an elevated admin.
    ///
    /// The requested role is ignored; somebody has to be able to register
    /// everyone else.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::AlreadyBootstrapped`] when any profile
    /// exists, or a validation or store error.
    pub async fn bootstrap(&self, request: RegisterUserRequest) -> IdentityResult<UserProfile> {
        if !self.store.list_profiles().await?.is_empty() {
            return Err(IdentityError::AlreadyBootstrapped);
        }
        let profile = UserProfile::new(
            request.display_name,
            request.email,
            Role::ElevatedAdmin,
            &*self.clock,
        )?;
        self.insert(profile).await
    }

    /// Registers a new active profile.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::AccessDenied`] when `actor` lacks
    /// [`Capability::ManageUsers`], [`IdentityError::EmailTaken`] when the
    /// address is in use, or a validation or store error.
    pub async fn register_user(
        &self,
        actor: UserId,
        request: RegisterUserRequest,
    ) -> IdentityResult<UserProfile> {
        self.resolver
            .resolve(actor)
            .await?
            .require(Capability::ManageUsers)?;
        let profile =
            UserProfile::new(request.display_name, request.email, request.role, &*self.clock)?;
        if self.store.find_profile_by_email(profile.email()).await?.is_some() {
            return Err(IdentityError::EmailTaken(profile.email().to_owned()));
        }
        self.insert(profile).await
    }

    /// Changes the role of an active profile.
    ///
    /// The new role takes effect at the target's next resolution.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::AccessDenied`] when `actor` lacks
    /// [`Capability::ManageUsers`], [`IdentityError::ProfileNotFound`] for
    /// an unknown target, a domain error when the target is tombstoned, or
    /// a store error.
    pub async fn assign_role(
        &self,
        actor: UserId,
        user_id: UserId,
        role: Role,
    ) -> IdentityResult<UserProfile> {
        self.resolver
            .resolve(actor)
            .await?
            .require(Capability::ManageUsers)?;
        let mut profile = self
            .store
            .find_profile_unfiltered(user_id)
            .await?
            .ok_or(IdentityError::ProfileNotFound(user_id))?;
        if !profile.is_active() {
            return Err(IdentityDomainError::ProfileDeleted(user_id).into());
        }
        let previous = profile.role();
        if previous == role {
            return Ok(profile);
        }
        profile.change_role(role);

        let mut changes = ChangeSet::new();
        changes.update_profile(profile.clone());
        self.store.commit(changes).await?;
        info!(%user_id, %previous, %role, %actor, "changed user role");
        Ok(profile)
    }

    /// Lists the profiles `viewer` may see.
    ///
    /// Callers holding [`Capability::ViewAll`] see every active profile;
    /// everyone else sees only their own.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::CallerNotFound`] for an inactive viewer or a
    /// store error.
    pub async fn visible_profiles(&self, viewer: UserId) -> IdentityResult<Vec<UserProfile>> {
        let caller = self.resolver.resolve(viewer).await?;
        let profiles = self.store.list_profiles().await?;
        Ok(profiles
            .into_iter()
            .filter(UserProfile::is_active)
            .filter(|profile| caller.can(Capability::ViewAll) || profile.id() == viewer)
            .collect())
    }

    /// Finds an active profile visible to `viewer`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::ProfileNotFound`] when the profile is
    /// missing, tombstoned, or hidden from the viewer.
    pub async fn find_profile(
        &self,
        viewer: UserId,
        user_id: UserId,
    ) -> IdentityResult<UserProfile> {
        let caller = self.resolver.resolve(viewer).await?;
        if user_id != viewer && !caller.can(Capability::ViewAll) {
            return Err(IdentityError::ProfileNotFound(user_id));
        }
        self.store
            .find_profile_unfiltered(user_id)
            .await?
            .filter(UserProfile::is_active)
            .ok_or(IdentityError::ProfileNotFound(user_id))
    }

    async fn insert(&self, profile: UserProfile) -> IdentityResult<UserProfile> {
        let mut changes = ChangeSet::new();
        changes.insert_profile(profile.clone());
        self.store.commit(changes).await.map_err(|err| match err {
            StoreError::DuplicateEmail(email) => IdentityError::EmailTaken(email),
            other => IdentityError::Store(other),
        })?;
        info!(user_id = %profile.id(), role = %profile.role(), "registered user");
        Ok(profile)
    }
}
