//! All-or-nothing commits and row constraints of the in-memory store.

use crate::store_contract;
use rstest::{fixture, rstest};
use taskward::persistence::adapters::memory::InMemoryStore;

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_commit_writes_nothing(store: InMemoryStore) -> eyre::Result<()> {
    store_contract::failed_commit_writes_nothing(&store).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn constraints_and_idempotent_inserts(store: InMemoryStore) -> eyre::Result<()> {
    store_contract::constraints_and_idempotent_inserts(&store).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edit_request_guards(store: InMemoryStore) -> eyre::Result<()> {
    store_contract::edit_request_guards(&store).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn directory_reads_skip_tombstones(store: InMemoryStore) -> eyre::Result<()> {
    store_contract::directory_reads_skip_tombstones(&store).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tombstone_and_pending_request_exclude_each_other(
    store: InMemoryStore,
) -> eyre::Result<()> {
    store_contract::tombstone_and_pending_request_exclude_each_other(&store).await
}
