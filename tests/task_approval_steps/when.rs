//! When steps for task approval BDD scenarios.

use super::world::{ApprovalWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when(r#""{name}" approves the task"#)]
fn reviewer_approves(world: &mut ApprovalWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let actor = world.person(&name);
    let result = run_async(world.service.approvals().approve(task_id, &actor, None))
        .wrap_err("approve task")?;
    world.task = Some(result.task.clone());
    world.last_review = Some(result);
    Ok(())
}

#[when(r#""{name}" rejects the task with note "{note}""#)]
fn reviewer_rejects(
    world: &mut ApprovalWorld,
    name: String,
    note: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let actor = world.person(&name);
    let result = run_async(world.service.approvals().reject(task_id, &actor, Some(note)))
        .wrap_err("reject task")?;
    world.task = Some(result.task.clone());
    world.last_review = Some(result);
    Ok(())
}

#[when(r#""{name}" completes the task"#)]
fn user_completes(world: &mut ApprovalWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let actor = world.person(&name);
    let result = run_async(world.service.complete_task(task_id, &actor, None))
        .wrap_err("complete task")?;
    world.task = Some(result.task.clone());
    world.last_transition = Some(result);
    Ok(())
}

#[when(r#""{name}" restarts the task"#)]
fn user_restarts(world: &mut ApprovalWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let actor = world.person(&name);
    let result = run_async(world.service.restart_task(task_id, &actor))
        .wrap_err("restart task")?;
    world.task = Some(result.task.clone());
    world.last_transition = Some(result);
    Ok(())
}
