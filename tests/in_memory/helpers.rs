//! Shared fixtures for in-memory integration tests.

use crate::test_helpers::Team;
use std::sync::Arc;
use taskward::persistence::adapters::memory::InMemoryStore;

/// Team over a fresh in-memory store.
pub type MemoryTeam = Team<InMemoryStore>;

/// Assembles a team over a fresh in-memory store.
///
/// # Errors
///
/// Returns an error when seeding the directory fails.
pub async fn memory_team() -> eyre::Result<MemoryTeam> {
    Team::assemble(Arc::new(InMemoryStore::new())).await
}
