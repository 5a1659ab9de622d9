//! Roles and the fixed capability sets they grant.

use super::ParseRoleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role assigned to a user profile.
///
/// Roles are stored on the profile and never derived from other data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Reviewer role: approves work, resolves edit requests, deletes and
    /// restores records.
    ElevatedAdmin,
    /// Coordinator role: creates and assigns tasks, proposes edits.
    Admin,
    /// Regular team member who works on assigned tasks.
    StandardUser,
}

impl Role {
    /// Every role, highest privilege first.
    pub const ALL: [Self; 3] = [Self::ElevatedAdmin, Self::Admin, Self::StandardUser];

    /// Roles whose holders count as administrators for notification
    /// purposes.
    pub const ADMINISTRATORS: [Self; 2] = [Self::ElevatedAdmin, Self::Admin];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ElevatedAdmin => "elevated_admin",
            Self::Admin => "admin",
            Self::StandardUser => "standard_user",
        }
    }

    /// Returns the capability set granted by this role.
    #[must_use]
    pub const fn capabilities(self) -> CapabilitySet {
        CapabilitySet::for_role(self)
    }

    /// Returns whether holders of this role count as administrators.
    #[must_use]
    pub const fn is_administrator(self) -> bool {
        matches!(self, Self::ElevatedAdmin | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "elevated_admin" => Ok(Self::ElevatedAdmin),
            "admin" => Ok(Self::Admin),
            "standard_user" => Ok(Self::StandardUser),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// A named permission granted through role membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// See every task and profile, not just one's own.
    ViewAll,
    /// Create tasks.
    CreateTask,
    /// Add and remove task assignees.
    Assign,
    /// Propose changes to an existing task.
    RequestEdit,
    /// Post organization-wide bulletins.
    PostBulletin,
    /// Approve, send back, or reopen reviewed work.
    Review,
    /// Approve or reject edit requests.
    ResolveEditRequest,
    /// Edit tasks without a request, leaving an audit row.
    DirectEdit,
    /// Tombstone tasks and users.
    Delete,
    /// Clear tombstones.
    Restore,
    /// Register users and change their roles.
    ManageUsers,
}

impl Capability {
    /// Every capability in declaration order.
    pub const ALL: [Self; 11] = [
        Self::ViewAll,
        Self::CreateTask,
        Self::Assign,
        Self::RequestEdit,
        Self::PostBulletin,
        Self::Review,
        Self::ResolveEditRequest,
        Self::DirectEdit,
        Self::Delete,
        Self::Restore,
        Self::ManageUsers,
    ];

    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViewAll => "view_all",
            Self::CreateTask => "create_task",
            Self::Assign => "assign",
            Self::RequestEdit => "request_edit",
            Self::PostBulletin => "post_bulletin",
            Self::Review => "review",
            Self::ResolveEditRequest => "resolve_edit_request",
            Self::DirectEdit => "direct_edit",
            Self::Delete => "delete",
            Self::Restore => "restore",
            Self::ManageUsers => "manage_users",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of capabilities held by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    const COORDINATOR: Self = Self::EMPTY
        .with(Capability::ViewAll)
        .with(Capability::CreateTask)
        .with(Capability::Assign)
        .with(Capability::RequestEdit)
        .with(Capability::PostBulletin);

    const REVIEWER: Self = Self::COORDINATOR
        .with(Capability::Review)
        .with(Capability::ResolveEditRequest)
        .with(Capability::DirectEdit)
        .with(Capability::Delete)
        .with(Capability::Restore)
        .with(Capability::ManageUsers);

    /// Returns the fixed capability set for a role.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::ElevatedAdmin => Self::REVIEWER,
            Role::Admin => Self::COORDINATOR,
            Role::StandardUser => Self::EMPTY,
        }
    }

    /// Returns a copy of the set with `capability` added.
    #[must_use]
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Returns whether the set grants `capability`.
    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Returns whether the set grants nothing.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the granted capabilities in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |capability| self.contains(*capability))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}
