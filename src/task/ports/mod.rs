//! Port contracts for task lifecycle reads.
//!
//! Writes go through [`crate::persistence::ChangeSetCommitter`].

mod store;

pub use store::TaskStore;
