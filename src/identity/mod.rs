//! Users, roles, and capability-based authorization.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Orchestration services in [`services`]

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
