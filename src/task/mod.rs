//! Task lifecycle management.
//!
//! Tasks move through a fixed status machine, carry any number of
//! assignees, and only change content through audited edit requests. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Orchestration services in [`services`]
//!
//! Adapters live in [`crate::persistence::adapters`], shared with the other
//! contexts so one commit can span them.

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
