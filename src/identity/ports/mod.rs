//! Port contracts for identity lookups.

mod directory;

pub use directory::IdentityDirectory;
