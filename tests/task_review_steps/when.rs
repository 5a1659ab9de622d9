//! When steps for task review BDD scenarios.

use super::world::{TaskReviewWorld, run_async};
use rstest_bdd_macros::when;

#[when("the worker submits the task for review")]
fn worker_submits(world: &mut TaskReviewWorld) -> Result<(), eyre::Report> {
    let team = world.team()?;
    let outcome = run_async(
        team.engine
            .lifecycle()
            .submit_for_review(team.worker, world.task_id()?),
    );
    world.outcome = Some(outcome);
    Ok(())
}

#[when(r#"the elevated admin requests changes saying "{comment}""#)]
fn elevated_requests_changes(
    world: &mut TaskReviewWorld,
    comment: String,
) -> Result<(), eyre::Report> {
    let team = world.team()?;
    let outcome = run_async(team.engine.lifecycle().request_changes(
        team.elevated,
        world.task_id()?,
        Some(comment.as_str()),
    ));
    world.outcome = Some(outcome);
    Ok(())
}

#[when("the admin approves the task")]
fn admin_approves(world: &mut TaskReviewWorld) -> Result<(), eyre::Report> {
    let team = world.team()?;
    let outcome = run_async(
        team.engine
            .lifecycle()
            .approve(team.admin, world.task_id()?, None),
    );
    world.outcome = Some(outcome);
    Ok(())
}

#[when("the elevated admin deletes the task")]
fn elevated_deletes(world: &mut TaskReviewWorld) -> Result<(), eyre::Report> {
    let team = world.team()?;
    let outcome = run_async(
        team.engine
            .retention()
            .soft_delete_task(team.elevated, world.task_id()?),
    );
    world.outcome = Some(outcome);
    Ok(())
}
