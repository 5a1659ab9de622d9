//! Application services for identity and authorization.

mod error;
mod registry;
mod resolver;

pub use error::{IdentityError, IdentityResult};
pub use registry::{IdentityService, RegisterUserRequest};
pub use resolver::RoleResolver;
