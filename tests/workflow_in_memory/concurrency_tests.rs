//! Simultaneous reviewers racing on one task.

use std::sync::Arc;

use super::helpers::{Stack, members};
use eyre::ensure;
use rstest::rstest;
use taxflow::{
    config::{ConcurrencyConfig, WorkflowConfig},
    workflow::{
        domain::{Actor, ReviewOutcome, TaskStatus, UserId},
        ports::NotificationKind,
    },
};

fn contended_stack() -> Stack {
    Stack::with_config(&WorkflowConfig {
        concurrency: ConcurrencyConfig {
            max_conflict_retries: 8,
        },
        ..WorkflowConfig::default()
    })
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_approvals_are_all_counted() -> eyre::Result<()> {
    let stack = Arc::new(contended_stack());
    let owner = Actor::member(UserId::new());
    let reviewers = members(5);
    let ids: Vec<UserId> = reviewers.iter().map(Actor::user_id).collect();
    let task = stack.task_in_review(&owner, &ids).await?;

    let handles: Vec<_> = reviewers
        .into_iter()
        .map(|reviewer| {
            let shared = Arc::clone(&stack);
            let task_id = task.id();
            tokio::spawn(async move {
                shared
                    .service
                    .approvals()
                    .approve(task_id, &reviewer, None)
                    .await
            })
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await??.outcome);
    }

    ensure!(
        outcomes
            .iter()
            .filter(|outcome| **outcome == ReviewOutcome::AllApproved)
            .count()
            == 1,
        "exactly one approval completes consensus: {outcomes:?}"
    );
    ensure!(outcomes.iter().all(|outcome| outcome.is_success()));

    let stored = stack.service.task(task.id()).await?;
    ensure!(stored.status() == TaskStatus::Approved);
    ensure!(stored.reviewers().iter().all(|record| record.has_approved()));

    let approved_notices = stack
        .notifier
        .delivered()
        .iter()
        .filter(|notice| notice.kind == NotificationKind::TaskApproved)
        .count();
    ensure!(approved_notices == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_approve_and_reject_settle_on_one_outcome() -> eyre::Result<()> {
    let stack = Arc::new(contended_stack());
    let owner = Actor::member(UserId::new());
    let reviewers = members(2);
    let ids: Vec<UserId> = reviewers.iter().map(Actor::user_id).collect();
    let task = stack.task_in_review(&owner, &ids).await?;
    let [approver, rejecter] = reviewers.as_slice() else {
        eyre::bail!("two reviewers expected");
    };

    let approve = {
        let shared = Arc::clone(&stack);
        let actor = *approver;
        let task_id = task.id();
        tokio::spawn(async move {
            shared
                .service
                .approvals()
                .approve(task_id, &actor, None)
                .await
        })
    };
    let reject = {
        let shared = Arc::clone(&stack);
        let actor = *rejecter;
        let task_id = task.id();
        tokio::spawn(async move {
            shared
                .service
                .approvals()
                .reject(task_id, &actor, Some("period mismatch".to_owned()))
                .await
        })
    };
    let approve_outcome = approve.await??.outcome;
    let reject_outcome = reject.await??.outcome;

    ensure!(reject_outcome == ReviewOutcome::TaskRejected);
    ensure!(matches!(
        approve_outcome,
        ReviewOutcome::Success | ReviewOutcome::WrongStatus
    ));
    let stored = stack.service.task(task.id()).await?;
    ensure!(stored.status() == TaskStatus::Rejected);
    Ok(())
}
