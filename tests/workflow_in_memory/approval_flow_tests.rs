//! End-to-end approval flows over the in-memory adapters.

use std::sync::Arc;

use super::helpers::{Stack, members, privileged, stack};
use eyre::ensure;
use rstest::rstest;
use taxflow::{
    config::WorkflowConfig,
    workflow::{
        domain::{Actor, ReviewOutcome, TaskStatus, TeamId, TimelineEventKind, UserId},
        ports::NotificationKind,
        services::{NewTaskRequest, TimelineService, TransitionOutcome},
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejection_then_rework_then_approval(stack: Stack) -> eyre::Result<()> {
    let owner = Actor::member(UserId::new());
    let reviewers = members(2);
    let ids: Vec<UserId> = reviewers.iter().map(Actor::user_id).collect();
    let task = stack.task_in_review(&owner, &ids).await?;
    let approvals = stack.service.approvals();
    let [accountant, partner] = reviewers.as_slice() else {
        eyre::bail!("two reviewers expected");
    };

    approvals.approve(task.id(), accountant, None).await?;
    let rejected = approvals
        .reject(task.id(), partner, Some("depreciation schedule missing".to_owned()))
        .await?;
    ensure!(rejected.outcome == ReviewOutcome::TaskRejected);

    let restarted = stack.service.restart_task(task.id(), &owner).await?;
    ensure!(restarted.outcome == TransitionOutcome::Success);
    ensure!(restarted.task.rejection_reason().is_none());

    stack.service.submit_for_review(task.id(), &owner).await?;
    stack.service.start_review(task.id(), partner).await?;
    let first = approvals.approve(task.id(), partner, None).await?;
    ensure!(first.outcome == ReviewOutcome::Success);
    ensure!(first.approval_status.approved_count == 1);
    let second = approvals.approve(task.id(), accountant, None).await?;
    ensure!(second.outcome == ReviewOutcome::AllApproved);
    ensure!(second.task.status() == TaskStatus::Approved);

    let notices = stack.notifier.delivered();
    ensure!(
        notices
            .iter()
            .filter(|notice| notice.kind == NotificationKind::TaskRejected)
            .count()
            == 1
    );
    ensure!(
        notices
            .iter()
            .any(|notice| notice.kind == NotificationKind::TaskRestarted
                && notice.recipients == ids)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reviewer_team_members_join_consensus(stack: Stack) -> eyre::Result<()> {
    let owner = Actor::member(UserId::new());
    let team = TeamId::new();
    let assigned = Actor::member(UserId::new());
    let member = Actor::member(UserId::new());
    stack.directory.add_member(team, member.user_id())?;

    let created = stack
        .service
        .create_task(
            NewTaskRequest::new("Group consolidation", owner.user_id())
                .with_reviewer_team(team)
                .with_reviewers([assigned.user_id()]),
        )
        .await?;
    stack.service.submit_for_review(created.id(), &owner).await?;
    let opened = stack.service.start_review(created.id(), &member).await?;
    ensure!(opened.outcome == TransitionOutcome::Success);

    let assigned_vote = stack
        .service
        .approvals()
        .approve(created.id(), &assigned, None)
        .await?;
    ensure!(
        assigned_vote.outcome == ReviewOutcome::AllApproved,
        "team members only count once they act"
    );
    ensure!(assigned_vote.approval_status.total_reviewers == 1);

    let late_member = stack
        .service
        .approvals()
        .approve(created.id(), &member, None)
        .await?;
    ensure!(late_member.outcome == ReviewOutcome::WrongStatus);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn timeline_service_serves_stored_history(stack: Stack) -> eyre::Result<()> {
    let owner = Actor::member(UserId::new());
    let reviewer = Actor::member(UserId::new());
    let task = stack.task_in_review(&owner, &[reviewer.user_id()]).await?;
    stack
        .service
        .approvals()
        .approve(task.id(), &reviewer, Some("agreed".to_owned()))
        .await?;
    stack
        .service
        .complete_task(task.id(), &privileged(), None)
        .await?;

    let timeline = TimelineService::new(Arc::clone(&stack.repository))
        .timeline(task.id())
        .await?;

    let kinds: Vec<_> = timeline.iter().map(|event| event.kind).collect();
    ensure!(
        kinds
            == vec![
                TimelineEventKind::Created,
                TimelineEventKind::Submitted,
                TimelineEventKind::ReviewStarted,
                TimelineEventKind::ReviewerApproved,
                TimelineEventKind::Approved,
                TimelineEventKind::Completed,
            ],
        "unexpected timeline {kinds:?}"
    );
    ensure!(timeline.windows(2).all(|pair| match pair {
        [earlier, later] => earlier.at <= later.at,
        _ => true,
    }));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn configured_subject_templates_are_used() -> eyre::Result<()> {
    let config = WorkflowConfig::from_toml_str(
        "[notifications.subjects]\ntask_approved = \"Signed off: {{ task_title }}\"\n",
    )?;
    let stack = Stack::with_config(&config);
    let owner = Actor::member(UserId::new());
    let reviewer = Actor::member(UserId::new());
    let task = stack.task_in_review(&owner, &[reviewer.user_id()]).await?;

    stack
        .service
        .approvals()
        .approve(task.id(), &reviewer, None)
        .await?;

    let approved = stack
        .notifier
        .delivered()
        .into_iter()
        .find(|notice| notice.kind == NotificationKind::TaskApproved)
        .ok_or_else(|| eyre::eyre!("missing approval notification"))?;
    ensure!(approved.subject == "Signed off: Statutory accounts");
    ensure!(approved.recipients == vec![owner.user_id()]);
    Ok(())
}
