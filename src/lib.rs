//! Taskward: task lifecycle and authorization engine.
//!
//! Role-gated review workflow, audited edit approvals, multi-assignee
//! tasks, soft delete with scheduled purge, and event-driven notification
//! fanout over a pluggable store.
//!
//! # Architecture
//!
//! Taskward follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for store access
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//! - **Services**: Authorization and orchestration over one atomic commit
//!
//! # Modules
//!
//! - [`identity`]: Profiles, roles, capabilities, and caller resolution
//! - [`task`]: Status machine, assignments, edit requests, and retention
//! - [`notification`]: Recipient rules, rendering, fanout, and inboxes
//! - [`persistence`]: Change sets, store errors, and adapters
//! - [`engine`]: All services wired to one store
//! - [`config`]: TOML configuration for the purge job and store
//! - [`error`]: Machine-readable error classification

pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod notification;
pub mod persistence;
pub mod task;

pub use engine::Engine;
pub use error::ErrorKind;

#[cfg(test)]
mod test_support;
