//! Then steps for task approval BDD scenarios.

use super::world::ApprovalWorld;
use rstest_bdd_macros::then;
use taxflow::workflow::{domain::TaskStatus, services::TransitionOutcome};

#[then(r#"the review outcome is "{code}""#)]
fn review_outcome_is(world: &mut ApprovalWorld, code: String) -> Result<(), eyre::Report> {
    let review = world
        .last_review
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing review result"))?;
    if review.outcome.as_str() != code {
        return Err(eyre::eyre!(
            "expected outcome {code}, found {} ({})",
            review.outcome,
            review.message
        ));
    }
    Ok(())
}

#[then("the approval progress is {percent:u8} percent")]
fn approval_progress_is(world: &mut ApprovalWorld, percent: u8) -> Result<(), eyre::Report> {
    let review = world
        .last_review
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing review result"))?;
    eyre::ensure!(
        review.approval_status.progress_percent == percent,
        "expected {percent}% progress, found {}%",
        review.approval_status.progress_percent
    );
    Ok(())
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &mut ApprovalWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let actual = world.task()?.status();
    eyre::ensure!(
        actual == expected,
        "expected status {expected}, found {actual}"
    );
    Ok(())
}

#[then(r#"the rejection reason is "{reason}""#)]
fn rejection_reason_is(world: &mut ApprovalWorld, reason: String) -> Result<(), eyre::Report> {
    let actual = world.task()?.rejection_reason();
    eyre::ensure!(
        actual == Some(reason.as_str()),
        "expected rejection reason {reason:?}, found {actual:?}"
    );
    Ok(())
}

#[then("the task has no rejection reason")]
fn no_rejection_reason(world: &mut ApprovalWorld) -> Result<(), eyre::Report> {
    let actual = world.task()?.rejection_reason();
    eyre::ensure!(actual.is_none(), "unexpected rejection reason {actual:?}");
    Ok(())
}

#[then("every reviewer is pending")]
fn every_reviewer_pending(world: &mut ApprovalWorld) -> Result<(), eyre::Report> {
    let task = world.task()?;
    eyre::ensure!(
        task.reviewers().iter().all(|record| record.is_pending()),
        "stale reviewer decisions remain"
    );
    Ok(())
}

#[then(r#"the transition is refused because the task is "{status}""#)]
fn transition_refused(world: &mut ApprovalWorld, status: String) -> Result<(), eyre::Report> {
    let transition = world
        .last_transition
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing transition result"))?;
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    match transition.outcome {
        TransitionOutcome::WrongStatus { actual, .. } if actual == expected => Ok(()),
        other => Err(eyre::eyre!(
            "expected wrong-status refusal from {expected}, got {other:?}"
        )),
    }
}
