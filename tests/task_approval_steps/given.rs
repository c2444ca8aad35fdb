//! Given steps for task approval BDD scenarios.

use super::world::{ApprovalWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taxflow::workflow::{domain::UserId, services::NewTaskRequest};

#[given(r#"a task "{title}" owned by "{owner}" with reviewers "{reviewers}""#)]
fn task_with_reviewers(
    world: &mut ApprovalWorld,
    title: String,
    owner: String,
    reviewers: String,
) -> Result<(), eyre::Report> {
    let owner_id = world.person(&owner).user_id();
    let names: Vec<String> = reviewers
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    let reviewer_ids: Vec<UserId> = names
        .iter()
        .map(|name| world.person(name).user_id())
        .collect();

    let created = run_async(
        world
            .service
            .create_task(NewTaskRequest::new(title, owner_id).with_reviewers(reviewer_ids)),
    )
    .wrap_err("create task for approval scenario")?;

    world.owner = Some(owner);
    world.reviewers = names;
    world.task = Some(created);
    Ok(())
}

#[given("the task is in review")]
fn task_in_review(world: &mut ApprovalWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let owner_name = world
        .owner
        .clone()
        .ok_or_else(|| eyre::eyre!("missing owner in scenario world"))?;
    let opener_name = world
        .reviewers
        .first()
        .cloned()
        .ok_or_else(|| eyre::eyre!("scenario task has no reviewers"))?;
    let owner = world.person(&owner_name);
    let opener = world.person(&opener_name);

    let submitted = run_async(world.service.submit_for_review(task_id, &owner))
        .wrap_err("submit task in scenario setup")?;
    eyre::ensure!(submitted.outcome.is_success(), "{}", submitted.message);
    let opened = run_async(world.service.start_review(task_id, &opener))
        .wrap_err("start review in scenario setup")?;
    eyre::ensure!(opened.outcome.is_success(), "{}", opened.message);

    world.task = Some(opened.task);
    Ok(())
}
