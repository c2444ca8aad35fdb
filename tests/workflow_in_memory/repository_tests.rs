//! Storage contract of the in-memory task repository.

use super::helpers::{Stack, stack};
use rstest::rstest;
use taxflow::workflow::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Actor, TaskStatus, UserId},
    ports::{TaskRepository, TaskRepositoryError},
    services::NewTaskRequest,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn storing_the_same_task_twice_is_rejected(stack: Stack) {
    let task = stack
        .service
        .create_task(NewTaskRequest::new("Dividend resolution", UserId::new()))
        .await
        .expect("task created");

    let result = stack.repository.store(&task).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_copy_is_refused_with_version_conflict(stack: Stack) {
    let owner = Actor::member(UserId::new());
    let stale = stack
        .service
        .create_task(NewTaskRequest::new("Dividend resolution", owner.user_id()))
        .await
        .expect("task created");
    let fresh = stack
        .service
        .submit_for_review(stale.id(), &owner)
        .await
        .expect("submitted")
        .task;

    let result = stack.repository.update(&stale).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::VersionConflict { expected, actual, .. })
            if expected == stale.version() && actual == fresh.version()
    ));
    let stored = stack
        .repository
        .find_by_id(stale.id())
        .await
        .expect("lookup")
        .expect("task present");
    assert_eq!(stored.status(), TaskStatus::Submitted);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_of_unknown_task_is_not_found(stack: Stack) {
    let task = stack
        .service
        .create_task(NewTaskRequest::new("Dividend resolution", UserId::new()))
        .await
        .expect("task created");
    let elsewhere = InMemoryTaskRepository::new();

    let result = elsewhere.update(&task).await;

    assert!(matches!(result, Err(TaskRepositoryError::NotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn successful_update_bumps_version_by_one(stack: Stack) {
    let owner = Actor::member(UserId::new());
    let task = stack
        .service
        .create_task(NewTaskRequest::new("Dividend resolution", owner.user_id()))
        .await
        .expect("task created");

    let next = stack.repository.update(&task).await.expect("update");

    assert_eq!(next, task.version() + 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn find_by_reviewer_returns_assigned_tasks_only(stack: Stack) {
    let owner = UserId::new();
    let reviewer = UserId::new();
    let assigned = stack
        .service
        .create_task(NewTaskRequest::new("Assigned", owner).with_reviewers([reviewer]))
        .await
        .expect("assigned task");
    stack
        .service
        .create_task(NewTaskRequest::new("Unassigned", owner).with_reviewers([UserId::new()]))
        .await
        .expect("other task");

    let found = stack
        .repository
        .find_by_reviewer(reviewer)
        .await
        .expect("lookup");

    assert_eq!(found, vec![assigned]);
}
