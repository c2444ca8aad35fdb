//! Reviewer consensus: recording approvals and rejections.

use super::{
    WorkflowServiceResult,
    mutation::{Step, TaskMutator, load_task, resolve_membership},
    notify::{NotificationDispatcher, NotificationEvent},
};
use crate::config::{ConcurrencyConfig, NotificationConfig, WorkflowConfig};
use crate::workflow::{
    domain::{
        Actor, ApprovalStatus, ConsensusDecision, ReviewEligibility, ReviewOutcome,
        ReviewerRecord, Task, TaskId, TaskStatus, TeamMembership, UserId, WorkflowDomainError,
        consensus_decision,
    },
    ports::{NotificationKind, TaskRepository, UserDirectory, WorkflowNotifier},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of an approve or reject call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewResult {
    /// Typed outcome code.
    pub outcome: ReviewOutcome,
    /// Human-readable explanation.
    pub message: String,
    /// Task as it stands after the call.
    pub task: Task,
    /// Consensus snapshot of `task`.
    pub approval_status: ApprovalStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    const fn noun(self) -> &'static str {
        match self {
            Self::Approve => "approval",
            Self::Reject => "rejection",
        }
    }
}

/// Multi-reviewer approval engine.
pub struct ApprovalService<R, D, N, C>
where
    R: TaskRepository,
    D: UserDirectory,
    N: WorkflowNotifier,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<D>,
    notifications: NotificationDispatcher<N>,
    clock: Arc<C>,
    concurrency: ConcurrencyConfig,
}

impl<R, D, N, C> Clone for ApprovalService<R, D, N, C>
where
    R: TaskRepository,
    D: UserDirectory,
    N: WorkflowNotifier,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            directory: Arc::clone(&self.directory),
            notifications: self.notifications.clone(),
            clock: Arc::clone(&self.clock),
            concurrency: self.concurrency.clone(),
        }
    }
}

impl<R, D, N, C> ApprovalService<R, D, N, C>
where
    R: TaskRepository,
    D: UserDirectory,
    N: WorkflowNotifier,
    C: Clock + Send + Sync,
{
    /// Creates an approval service with default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, directory: Arc<D>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            repository,
            directory,
            notifications: NotificationDispatcher::new(notifier, NotificationConfig::default()),
            clock,
            concurrency: ConcurrencyConfig::default(),
        }
    }

    /// Replaces the concurrency and notification settings.
    #[must_use]
    pub fn with_config(mut self, config: &WorkflowConfig) -> Self {
        self.concurrency = config.concurrency.clone();
        self.notifications.set_config(config.notifications.clone());
        self
    }

    /// Computes the consensus snapshot of a stored task.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowServiceError::TaskNotFound`] for unknown
    /// tasks and repository errors otherwise.
    pub async fn approval_status(&self, task_id: TaskId) -> WorkflowServiceResult<ApprovalStatus> {
        let task = load_task(&*self.repository, task_id).await?;
        Ok(ApprovalStatus::from_reviewers(task.reviewers()))
    }

    /// Checks whether `user_id` may approve or reject `task` now.
    ///
    /// The directory is only consulted for tasks with a reviewer team.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowServiceError::Directory`] when membership
    /// lookup fails.
    pub async fn can_user_review(
        &self,
        task: &Task,
        user_id: UserId,
    ) -> WorkflowServiceResult<ReviewEligibility> {
        let membership = resolve_membership(&*self.directory, task, user_id).await?;
        Ok(task.review_eligibility(user_id, membership))
    }

    /// Returns the user's reviewer record, creating one on `task` for
    /// reviewer-team members. The caller persists the task.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowServiceError::Directory`] when membership
    /// lookup fails.
    pub async fn resolve_or_create_reviewer(
        &self,
        task: &mut Task,
        user_id: UserId,
    ) -> WorkflowServiceResult<Option<ReviewerRecord>> {
        let membership = resolve_membership(&*self.directory, task, user_id).await?;
        Ok(task.resolve_or_create_reviewer(user_id, membership, &*self.clock))
    }

    /// Records an approval by `actor`.
    ///
    /// When every reviewer has approved, the task moves to `approved` in the
    /// same write.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowServiceError`] for missing tasks and
    /// infrastructure failures. Refusals are reported in the outcome.
    pub async fn approve(
        &self,
        task_id: TaskId,
        actor: &Actor,
        note: Option<String>,
    ) -> WorkflowServiceResult<ReviewResult> {
        self.review(task_id, actor, Verdict::Approve, note).await
    }

    /// Records a rejection by `actor` and moves the task to `rejected`.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowServiceError`] for missing tasks and
    /// infrastructure failures. Refusals are reported in the outcome.
    pub async fn reject(
        &self,
        task_id: TaskId,
        actor: &Actor,
        note: Option<String>,
    ) -> WorkflowServiceResult<ReviewResult> {
        self.review(task_id, actor, Verdict::Reject, note).await
    }

    /// Clears every reviewer decision on a stored task.
    ///
    /// Returns the number of records reset. Nothing is written when no
    /// record held a decision.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowServiceError`] for missing tasks and
    /// repository failures.
    pub async fn reset_approvals(&self, task_id: TaskId) -> WorkflowServiceResult<usize> {
        let clock = &*self.clock;
        let mutation = self
            .mutator()
            .apply(task_id, None, |task, _| {
                let cleared = task.reset_reviewer_decisions(clock);
                Ok(if cleared == 0 {
                    Step::Abort(0)
                } else {
                    Step::Commit(cleared)
                })
            })
            .await?;
        if mutation.committed {
            info!(%task_id, cleared = mutation.value, "reviewer decisions reset");
        }
        Ok(mutation.value)
    }

    /// Clears reviewer decisions on an in-memory task without persisting.
    pub fn reset_in_place(&self, task: &mut Task) -> usize {
        task.reset_reviewer_decisions(&*self.clock)
    }

    /// Adds `reviewer` to the task's reviewer set.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::ReviewerManagementDenied`] unless
    /// `assigned_by` owns the task or is privileged,
    /// [`WorkflowDomainError::ReviewerSetLocked`] once the task has left
    /// review, and [`WorkflowDomainError::DuplicateReviewer`] for existing
    /// reviewers.
    pub async fn assign_reviewer(
        &self,
        task_id: TaskId,
        assigned_by: &Actor,
        reviewer: UserId,
    ) -> WorkflowServiceResult<Task> {
        let clock = &*self.clock;
        let mutation = self
            .mutator()
            .apply(task_id, None, |task, _| {
                ensure_may_manage_reviewers(task, assigned_by)?;
                task.add_reviewer(reviewer, clock)?;
                Ok(Step::Commit(()))
            })
            .await?;
        info!(%task_id, %reviewer, assigned_by = %assigned_by.user_id(), "reviewer assigned");
        self.notifications
            .dispatch(NotificationEvent {
                kind: NotificationKind::ReviewerAdded,
                task: &mutation.task,
                actor: assigned_by.user_id(),
                recipients: vec![reviewer],
                note: None,
            })
            .await;
        Ok(mutation.task)
    }

    /// Removes `reviewer` and any decision it held.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::ReviewerManagementDenied`] unless
    /// `removed_by` owns the task or is privileged,
    /// [`WorkflowDomainError::ReviewerSetLocked`] unless the task is a
    /// draft or awaiting review, and
    /// [`WorkflowDomainError::ReviewerNotFound`] for unknown
    /// reviewers.
    pub async fn remove_reviewer(
        &self,
        task_id: TaskId,
        removed_by: &Actor,
        reviewer: UserId,
    ) -> WorkflowServiceResult<Task> {
        let clock = &*self.clock;
        let mutation = self
            .mutator()
            .apply(task_id, None, |task, _| {
                ensure_may_manage_reviewers(task, removed_by)?;
                task.remove_reviewer(reviewer, clock)?;
                Ok(Step::Commit(()))
            })
            .await?;
        info!(%task_id, %reviewer, removed_by = %removed_by.user_id(), "reviewer removed");
        Ok(mutation.task)
    }

    /// Lists in-review tasks where `user_id` still owes a decision.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowServiceError::Repository`] when the lookup
    /// fails.
    pub async fn pending_reviews(&self, user_id: UserId) -> WorkflowServiceResult<Vec<Task>> {
        let tasks = self.repository.find_by_reviewer(user_id).await?;
        Ok(tasks
            .into_iter()
            .filter(|task| {
                task.status() == TaskStatus::InReview
                    && task.reviewer(user_id).is_some_and(ReviewerRecord::is_pending)
            })
            .collect())
    }

    async fn review(
        &self,
        task_id: TaskId,
        actor: &Actor,
        verdict: Verdict,
        note: Option<String>,
    ) -> WorkflowServiceResult<ReviewResult> {
        let clock = &*self.clock;
        let mutation = self
            .mutator()
            .apply(task_id, Some(actor.user_id()), |task, membership| {
                apply_review(task, actor, membership, verdict, note.as_deref(), clock)
            })
            .await?;
        let (outcome, message) = mutation.value;
        let user_id = actor.user_id();

        if mutation.committed {
            info!(%task_id, %user_id, %outcome, "{} recorded", verdict.noun());
        } else {
            debug!(%task_id, %user_id, %outcome, reason = %message, "review refused");
        }

        let notification = match outcome {
            ReviewOutcome::AllApproved => Some(NotificationKind::TaskApproved),
            ReviewOutcome::TaskRejected => Some(NotificationKind::TaskRejected),
            _ => None,
        };
        if let Some(kind) = notification {
            self.notifications
                .dispatch(NotificationEvent {
                    kind,
                    task: &mutation.task,
                    actor: user_id,
                    recipients: vec![mutation.task.owner()],
                    note: note.as_deref(),
                })
                .await;
        }

        let approval_status = ApprovalStatus::from_reviewers(mutation.task.reviewers());
        Ok(ReviewResult {
            outcome,
            message,
            task: mutation.task,
            approval_status,
        })
    }

    fn mutator(&self) -> TaskMutator<'_, R, D> {
        TaskMutator::new(
            &*self.repository,
            &*self.directory,
            self.concurrency.max_conflict_retries,
        )
    }
}

fn ensure_may_manage_reviewers(task: &Task, actor: &Actor) -> Result<(), WorkflowDomainError> {
    if task.is_owner(actor.user_id()) || actor.is_privileged() {
        Ok(())
    } else {
        Err(WorkflowDomainError::ReviewerManagementDenied {
            task_id: task.id(),
            user_id: actor.user_id(),
        })
    }
}

fn apply_review(
    task: &mut Task,
    actor: &Actor,
    membership: TeamMembership,
    verdict: Verdict,
    note: Option<&str>,
    clock: &impl Clock,
) -> Result<Step<(ReviewOutcome, String)>, WorkflowDomainError> {
    let user_id = actor.user_id();
    let eligibility = task.review_eligibility(user_id, membership);
    if let Some(refusal) = eligibility.refusal() {
        return Ok(Step::Abort((refusal, eligibility.reason())));
    }

    if task
        .resolve_or_create_reviewer(user_id, membership, clock)
        .is_none()
    {
        return Ok(Step::Abort((
            ReviewOutcome::NotAReviewer,
            "reviewer record could not be created".to_owned(),
        )));
    }
    let recorded_at = clock.utc();
    let Some(record) = task.reviewer_mut(user_id) else {
        return Ok(Step::Abort((
            ReviewOutcome::NotAReviewer,
            ReviewEligibility::NotAReviewer.reason(),
        )));
    };
    match verdict {
        Verdict::Approve => record.record_approval(recorded_at, note.map(ToOwned::to_owned)),
        Verdict::Reject => record.record_rejection(recorded_at, note.map(ToOwned::to_owned)),
    }
    task.touch(clock);

    let status = ApprovalStatus::from_reviewers(task.reviewers());
    let decision = consensus_decision(&status)
        .filter(|decision| task.can_transition_to(decision.target_status(), actor, membership));
    let (outcome, message) = match decision {
        Some(ConsensusDecision::Approve) => {
            task.mark_approved(user_id, clock)?;
            (
                ReviewOutcome::AllApproved,
                format!("all {} reviewers approved; task approved", status.total_reviewers),
            )
        }
        Some(ConsensusDecision::Reject) => {
            task.mark_rejected(user_id, note.map(ToOwned::to_owned), clock)?;
            (
                ReviewOutcome::TaskRejected,
                "rejection recorded; task rejected".to_owned(),
            )
        }
        None => (
            ReviewOutcome::Success,
            format!(
                "{} recorded; {} of {} reviewers approved",
                verdict.noun(),
                status.approved_count,
                status.total_reviewers
            ),
        ),
    };
    Ok(Step::Commit((outcome, message)))
}
