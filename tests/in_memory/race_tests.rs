//! Concurrent writers racing on the same record.

use super::helpers::memory_team;
use eyre::{WrapErr, ensure};
use rstest::rstest;
use std::sync::Arc;
use taskward::ErrorKind;
use taskward::task::domain::{ProposedChanges, ReviewDecision, TaskStatus};

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn approve_and_request_changes_race_has_one_winner() -> eyre::Result<()> {
    let team = Arc::new(memory_team().await?);
    let task_id = team.task_in_review("Contended").await?.id();

    let approver = {
        let racer = Arc::clone(&team);
        tokio::spawn(async move {
            racer
                .engine
                .lifecycle()
                .approve(racer.elevated, task_id, None)
                .await
        })
    };
    let rejecter = {
        let racer = Arc::clone(&team);
        tokio::spawn(async move {
            racer
                .engine
                .lifecycle()
                .request_changes(racer.elevated, task_id, Some("again"))
                .await
        })
    };
    let approved = approver.await.wrap_err("join approver")?;
    let reworked = rejecter.await.wrap_err("join rejecter")?;

    ensure!(
        approved.is_ok() != reworked.is_ok(),
        "exactly one writer must win: {approved:?} / {reworked:?}"
    );
    let loser = approved
        .as_ref()
        .err()
        .or_else(|| reworked.as_ref().err())
        .ok_or_else(|| eyre::eyre!("no losing writer"))?;
    ensure!(loser.kind() == ErrorKind::InvalidTransition);

    let current = team.engine.lifecycle().find_task(team.admin, task_id).await?;
    let expected = if approved.is_ok() {
        TaskStatus::Closed
    } else {
        TaskStatus::WorkInProgress
    };
    ensure!(current.status() == expected);
    ensure!(current.invariants_hold());
    let history = team
        .engine
        .lifecycle()
        .transition_history(team.admin, task_id)
        .await?;
    ensure!(history.len() == 3, "one review transition is recorded");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn double_resolution_race_has_one_winner() -> eyre::Result<()> {
    let team = Arc::new(memory_team().await?);
    let task = team.task_for_worker("Contended").await?;
    let request = team
        .engine
        .edits()
        .create_edit_request(
            team.admin,
            task.id(),
            ProposedChanges::new().with_title("Renamed"),
        )
        .await?;

    let handles: Vec<_> = [ReviewDecision::Approve, ReviewDecision::Reject]
        .into_iter()
        .map(|decision| {
            let racer = Arc::clone(&team);
            let request_id = request.id();
            tokio::spawn(async move {
                racer
                    .engine
                    .edits()
                    .resolve_edit_request(racer.elevated, request_id, decision, None)
                    .await
            })
        })
        .collect();
    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await.wrap_err("join resolver")?);
    }

    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    ensure!(winners == 1, "exactly one resolution must win: {outcomes:?}");
    ensure!(
        outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().err())
            .all(|err| err.kind() == ErrorKind::NotPending)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn edit_request_and_soft_delete_race_never_leave_both() -> eyre::Result<()> {
    let team = Arc::new(memory_team().await?);
    for round in 0..16 {
        let task_id = team.task_for_worker(&format!("Contended {round}")).await?.id();
        let requester = {
            let racer = Arc::clone(&team);
            tokio::spawn(async move {
                racer
                    .engine
                    .edits()
                    .create_edit_request(
                        racer.admin,
                        task_id,
                        ProposedChanges::new().with_title("Renamed"),
                    )
                    .await
            })
        };
        let deleter = {
            let racer = Arc::clone(&team);
            tokio::spawn(async move {
                racer
                    .engine
                    .retention()
                    .soft_delete_task(racer.elevated, task_id)
                    .await
            })
        };
        let filed = requester.await.wrap_err("join requester")?;
        let deleted = deleter.await.wrap_err("join deleter")?;

        ensure!(
            filed.is_ok() != deleted.is_ok(),
            "exactly one writer must win: {filed:?} / {deleted:?}"
        );
        if let Err(err) = &filed {
            ensure!(err.kind() == ErrorKind::RecordDeleted, "request lost with {err}");
        }
        if let Err(err) = &deleted {
            ensure!(
                err.kind() == ErrorKind::HasPendingEditRequests,
                "delete lost with {err}"
            );
        }
    }
    Ok(())
}
