//! Then steps for task review BDD scenarios.

use super::world::{TaskReviewWorld, run_async};
use eyre::{WrapErr, ensure};
use rstest_bdd_macros::then;
use taskward::identity::domain::UserId;
use taskward::notification::domain::NotificationKind;
use taskward::task::domain::{Task, TaskStatus};

fn reload(world: &TaskReviewWorld) -> eyre::Result<Task> {
    let team = world.team()?;
    run_async(team.engine.lifecycle().find_task(team.elevated, world.task_id()?))
        .wrap_err("reload scenario task")
}

fn has_unread(world: &TaskReviewWorld, user_id: UserId, kind: &str) -> eyre::Result<bool> {
    let expected = NotificationKind::try_from(kind)
        .map_err(|err| eyre::eyre!("invalid notification kind in scenario: {err}"))?;
    let inbox = run_async(
        world
            .team()?
            .engine
            .notifications()
            .list_for_recipient(user_id, true),
    )?;
    Ok(inbox.iter().any(|n| n.kind() == expected && !n.is_read()))
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskReviewWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = reload(world)?;
    ensure!(
        task.status() == expected,
        "expected status {expected}, found {}",
        task.status()
    );
    Ok(())
}

#[then("the review request fields are cleared")]
fn review_fields_cleared(world: &TaskReviewWorld) -> Result<(), eyre::Report> {
    let task = reload(world)?;
    ensure!(
        !task.review().has_pending_request(),
        "review request still recorded: {:?}",
        task.review()
    );
    Ok(())
}

#[then(r#"each administrator has an unread "{kind}" notification"#)]
fn each_admin_notified(world: &TaskReviewWorld, kind: String) -> Result<(), eyre::Report> {
    let team = world.team()?;
    for admin in [team.elevated, team.admin] {
        ensure!(
            has_unread(world, admin, &kind)?,
            "administrator {admin} has no unread {kind} notification"
        );
    }
    Ok(())
}

#[then(r#"the worker has an unread "{kind}" notification"#)]
fn worker_notified(world: &TaskReviewWorld, kind: String) -> Result<(), eyre::Report> {
    let worker = world.team()?.worker;
    ensure!(
        has_unread(world, worker, &kind)?,
        "worker has no unread {kind} notification"
    );
    Ok(())
}

#[then(r#"the attempt fails with "{kind}""#)]
fn attempt_fails_with(world: &TaskReviewWorld, kind: String) -> Result<(), eyre::Report> {
    let outcome = world
        .outcome
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing outcome in scenario world"))?;
    match outcome {
        Ok(task) => Err(eyre::eyre!("expected {kind} error, operation returned {task:?}")),
        Err(err) => {
            ensure!(
                err.kind().as_str() == kind,
                "expected {kind} error, got {} ({err})",
                err.kind()
            );
            Ok(())
        }
    }
}
