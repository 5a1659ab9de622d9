//! Engine workflows against the `PostgreSQL` store.

use super::helpers::SchemaHarness;
use crate::test_helpers::Team;
use chrono::TimeDelta;
use eyre::ensure;
use rstest::rstest;
use std::sync::Arc;
use taskward::ErrorKind;
use taskward::notification::domain::NotificationKind;
use taskward::task::domain::{ProposedChanges, ReviewDecision, TaskStatus};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn review_cycle_persists_status_history_and_notifications() -> eyre::Result<()> {
    let Some(harness) = SchemaHarness::provision()? else {
        return Ok(());
    };
    let team = Team::assemble(Arc::new(harness.store_handle())).await?;
    let task = team.task_in_review("Ledger").await?;

    let closed = team
        .engine
        .lifecycle()
        .approve(team.elevated, task.id(), Some("Signed off"))
        .await?;
    let reloaded = team.engine.lifecycle().find_task(team.admin, task.id()).await?;
    let history = team
        .engine
        .lifecycle()
        .transition_history(team.admin, task.id())
        .await?;
    let inbox = team
        .engine
        .notifications()
        .list_for_recipient(team.worker, false)
        .await?;

    ensure!(closed.status() == TaskStatus::Closed);
    ensure!(reloaded == closed, "stored task differs: {reloaded:?}");
    ensure!(history.len() == 3);
    ensure!(
        inbox
            .iter()
            .any(|n| n.kind() == NotificationKind::ReviewCompleted)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_writer_loses_against_committed_update() -> eyre::Result<()> {
    let Some(harness) = SchemaHarness::provision()? else {
        return Ok(());
    };
    let team = Team::assemble(Arc::new(harness.store_handle())).await?;
    let task = team.task_in_review("Ledger").await?;
    let lifecycle = team.engine.lifecycle();

    lifecycle.approve(team.elevated, task.id(), None).await?;
    let late = lifecycle
        .request_changes(team.elevated, task.id(), Some("too late"))
        .await;

    ensure!(late.map_err(|err| err.kind()).err() == Some(ErrorKind::InvalidTransition));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approved_edit_and_purge_round_trip() -> eyre::Result<()> {
    let Some(harness) = SchemaHarness::provision()? else {
        return Ok(());
    };
    let team = Team::assemble(Arc::new(harness.store_handle())).await?;
    let task = team.task_for_worker("Ledger").await?;
    let edits = team.engine.edits();
    let request = edits
        .create_edit_request(
            team.admin,
            task.id(),
            ProposedChanges::new()
                .with_title("General ledger")
                .with_assignees([team.worker, team.teammate]),
        )
        .await?;
    edits
        .resolve_edit_request(team.elevated, request.id(), ReviewDecision::Approve, None)
        .await?;
    let retention = team.engine.retention();
    retention.soft_delete_task(team.elevated, task.id()).await?;
    team.clock.advance(TimeDelta::days(31));

    let report = retention.purge(30, 10).await?;

    ensure!(report.tasks == 1);
    ensure!(report.assignments == 2);
    let found = team.engine.lifecycle().find_task(team.admin, task.id()).await;
    ensure!(found.map_err(|err| err.kind()).err() == Some(ErrorKind::NotFound));
    Ok(())
}
