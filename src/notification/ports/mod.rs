//! Port contracts for recipient resolution and inbox reads.

mod directory;
mod store;

pub use directory::RecipientDirectory;
pub use store::NotificationStore;
