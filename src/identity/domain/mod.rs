//! Domain model for identities, roles, and capabilities.
//!
//! Roles are assigned to profiles; capabilities are a fixed function of the
//! role and are never computed from any other data.

mod caller;
mod error;
mod ids;
mod profile;
mod role;

pub use caller::Caller;
pub use error::{AccessDenied, IdentityDomainError, ParseRoleError};
pub use ids::UserId;
pub use profile::{PersistedProfileData, UserProfile};
pub use role::{Capability, CapabilitySet, Role};
