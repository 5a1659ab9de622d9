//! Commit atomicity and row constraints of the `PostgreSQL` store.

use super::helpers::SchemaHarness;
use crate::store_contract;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_commit_writes_nothing() -> eyre::Result<()> {
    let Some(harness) = SchemaHarness::provision()? else {
        return Ok(());
    };
    store_contract::failed_commit_writes_nothing(harness.store()).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn constraints_and_idempotent_inserts() -> eyre::Result<()> {
    let Some(harness) = SchemaHarness::provision()? else {
        return Ok(());
    };
    store_contract::constraints_and_idempotent_inserts(harness.store()).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edit_request_guards() -> eyre::Result<()> {
    let Some(harness) = SchemaHarness::provision()? else {
        return Ok(());
    };
    store_contract::edit_request_guards(harness.store()).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn directory_reads_skip_tombstones() -> eyre::Result<()> {
    let Some(harness) = SchemaHarness::provision()? else {
        return Ok(());
    };
    store_contract::directory_reads_skip_tombstones(harness.store()).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tombstone_and_pending_request_exclude_each_other() -> eyre::Result<()> {
    let Some(harness) = SchemaHarness::provision()? else {
        return Ok(());
    };
    store_contract::tombstone_and_pending_request_exclude_each_other(harness.store()).await
}
