//! End-to-end workflows through the engine facade.

use super::helpers::memory_team;
use eyre::ensure;
use rstest::rstest;
use taskward::ErrorKind;
use taskward::notification::domain::NotificationKind;
use taskward::task::domain::{
    EditRequestStatus, Priority, ProposedChanges, ReviewDecision, TaskStatus, TransitionKind,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn review_cycle_with_changes_requested_then_approved() -> eyre::Result<()> {
    let team = memory_team().await?;
    let task = team.task_in_review("Month-end close").await?;
    let lifecycle = team.engine.lifecycle();

    let reworked = lifecycle
        .request_changes(team.elevated, task.id(), Some("Attach bank statements"))
        .await?;
    ensure!(reworked.status() == TaskStatus::WorkInProgress);
    ensure!(reworked.review().requested_by.is_none());
    ensure!(reworked.archive().is_none());

    lifecycle.submit_for_review(team.worker, task.id()).await?;
    let closed = lifecycle
        .approve(team.elevated, task.id(), Some("Thanks"))
        .await?;
    ensure!(closed.status() == TaskStatus::Closed);
    ensure!(closed.review().comments.as_deref() == Some("Thanks"));

    let history = lifecycle.transition_history(team.admin, task.id()).await?;
    let kinds: Vec<TransitionKind> = history.iter().map(|record| record.kind()).collect();
    ensure!(
        kinds
            == vec![
                TransitionKind::Start,
                TransitionKind::SubmitForReview,
                TransitionKind::RequestChanges,
                TransitionKind::SubmitForReview,
                TransitionKind::Approve,
            ]
    );

    let worker_inbox = team
        .engine
        .notifications()
        .list_for_recipient(team.worker, false)
        .await?;
    let completed = worker_inbox
        .iter()
        .filter(|n| n.kind() == NotificationKind::ReviewCompleted)
        .count();
    ensure!(completed == 2);
    let admin_requests = team
        .engine
        .notifications()
        .list_for_recipient(team.admin, true)
        .await?
        .iter()
        .filter(|n| n.kind() == NotificationKind::ReviewRequested)
        .count();
    ensure!(admin_requests == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closed_task_can_be_reopened_and_reworked() -> eyre::Result<()> {
    let team = memory_team().await?;
    let task = team.task_in_review("Month-end close").await?;
    let lifecycle = team.engine.lifecycle();
    lifecycle.approve(team.elevated, task.id(), None).await?;

    let reopened = lifecycle
        .reopen(team.elevated, task.id(), Some("Auditor query"))
        .await?;
    let resubmitted = lifecycle.submit_for_review(team.worker, task.id()).await?;

    ensure!(reopened.archive().is_none());
    ensure!(resubmitted.status() == TaskStatus::Done);
    ensure!(resubmitted.review().requested_by == Some(team.worker));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edit_request_round_trip_reassigns_work() -> eyre::Result<()> {
    let team = memory_team().await?;
    let task = team.task_for_worker("Payroll").await?;
    let edits = team.engine.edits();

    let request = edits
        .create_edit_request(
            team.admin,
            task.id(),
            ProposedChanges::new()
                .with_priority(Priority::Urgent)
                .with_assignees([team.teammate]),
        )
        .await?;
    edits
        .resolve_edit_request(team.elevated, request.id(), ReviewDecision::Approve, None)
        .await?;

    let stored = edits.find_edit_request(team.admin, request.id()).await?;
    let assignees = team.engine.assignments().list_assignees(task.id()).await?;
    let teammate_view = team
        .engine
        .lifecycle()
        .find_task(team.teammate, task.id())
        .await?;
    let worker_view = team
        .engine
        .lifecycle()
        .find_task(team.worker, task.id())
        .await;

    ensure!(stored.status() == EditRequestStatus::Approved);
    ensure!(assignees.len() == 1 && assignees.contains(&team.teammate));
    ensure!(teammate_view.priority() == Priority::Urgent);
    ensure!(worker_view.map_err(|err| err.kind()).err() == Some(ErrorKind::NotFound));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn purge_after_retention_window_removes_deleted_user_inbox() -> eyre::Result<()> {
    let team = memory_team().await?;
    team.task_for_worker("Payroll").await?;
    let retention = team.engine.retention();
    retention
        .soft_delete_user(team.elevated, team.worker, Some(team.teammate))
        .await?;
    team.clock.advance(chrono::TimeDelta::days(45));

    let report = retention.purge(30, 50).await?;

    ensure!(report.users == 1);
    ensure!(report.notifications == 1);
    ensure!(report.tasks == 0);
    Ok(())
}
