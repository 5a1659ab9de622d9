//! Given steps for task review BDD scenarios.

use super::world::{TaskReviewWorld, run_async};
use crate::test_helpers::Team;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use std::sync::Arc;
use taskward::persistence::adapters::memory::InMemoryStore;
use taskward::task::domain::ProposedChanges;

#[given("a seeded team with an elevated admin, an admin, a worker and a teammate")]
fn seeded_team(world: &mut TaskReviewWorld) -> Result<(), eyre::Report> {
    let team = run_async(Team::assemble(Arc::new(InMemoryStore::new())))
        .wrap_err("seed team for review scenario")?;
    world.team = Some(team);
    Ok(())
}

#[given(r#"a task titled "{title}" assigned to the worker"#)]
fn task_for_worker(world: &mut TaskReviewWorld, title: String) -> Result<(), eyre::Report> {
    let task = run_async(world.team()?.task_for_worker(&title))?;
    world.task = Some(task);
    Ok(())
}

#[given("the worker has started the task")]
fn worker_started(world: &mut TaskReviewWorld) -> Result<(), eyre::Report> {
    let team = world.team()?;
    let started = run_async(team.engine.lifecycle().start(team.worker, world.task_id()?))
        .wrap_err("start task in scenario setup")?;
    world.task = Some(started);
    Ok(())
}

#[given("the task is awaiting review")]
fn awaiting_review(world: &mut TaskReviewWorld) -> Result<(), eyre::Report> {
    let team = world.team()?;
    let task_id = world.task_id()?;
    let lifecycle = team.engine.lifecycle();
    run_async(lifecycle.start(team.worker, task_id)).wrap_err("start task")?;
    let submitted = run_async(lifecycle.submit_for_review(team.worker, task_id))
        .wrap_err("submit task in scenario setup")?;
    world.task = Some(submitted);
    Ok(())
}

#[given(r#"the admin has proposed retitling the task to "{title}""#)]
fn admin_proposed_retitle(world: &mut TaskReviewWorld, title: String) -> Result<(), eyre::Report> {
    let team = world.team()?;
    run_async(team.engine.edits().create_edit_request(
        team.admin,
        world.task_id()?,
        ProposedChanges::new().with_title(title),
    ))
    .wrap_err("create edit request in scenario setup")?;
    Ok(())
}
