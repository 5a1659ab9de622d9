//! In-memory store integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `workflow_tests`: End-to-end review and edit workflows through the engine
//! - `commit_tests`: All-or-nothing change set commits and row constraints
//! - `race_tests`: Concurrent writers on the same task or edit request

mod store_contract;
mod test_helpers;

mod in_memory {
    pub mod helpers;

    mod commit_tests;
    mod race_tests;
    mod workflow_tests;
}
