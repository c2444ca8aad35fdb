//! Task lifecycle orchestration across the status state machine.

use super::{
    ApprovalService, WorkflowServiceResult,
    mutation::{Step, TaskMutator, load_task},
    notify::{NotificationDispatcher, NotificationEvent},
};
use crate::config::{ConcurrencyConfig, NotificationConfig, WorkflowConfig};
use crate::workflow::{
    domain::{
        Actor, ReviewerRecord, Task, TaskId, TaskStatus, TeamId, UserId, WorkflowDomainError,
    },
    ports::{NotificationKind, TaskRepository, UserDirectory, WorkflowNotifier},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Request payload for creating a draft task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskRequest {
    title: String,
    owner: UserId,
    reviewer_team: Option<TeamId>,
    reviewers: Vec<UserId>,
}

impl NewTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, owner: UserId) -> Self {
        Self {
            title: title.into(),
            owner,
            reviewer_team: None,
            reviewers: Vec::new(),
        }
    }

    /// Sets the team whose members may review without assignment.
    #[must_use]
    pub const fn with_reviewer_team(mut self, team: TeamId) -> Self {
        self.reviewer_team = Some(team);
        self
    }

    /// Sets the initially assigned reviewers, in review order.
    #[must_use]
    pub fn with_reviewers(mut self, reviewers: impl IntoIterator<Item = UserId>) -> Self {
        self.reviewers = reviewers.into_iter().collect();
        self
    }
}

/// Typed result of a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionOutcome {
    /// The task moved to the target status.
    Success,
    /// The task was not in the status the operation requires.
    WrongStatus {
        /// Status the operation requires.
        expected: TaskStatus,
        /// Status the task was in.
        actual: TaskStatus,
    },
    /// The task has neither reviewers nor a reviewer team, so review
    /// cannot open.
    NoReviewers,
    /// The actor lacks the capability for this transition.
    NotPermitted,
}

impl TransitionOutcome {
    /// Returns `true` when the transition was applied.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of a lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// Typed outcome.
    pub outcome: TransitionOutcome,
    /// Human-readable explanation.
    pub message: String,
    /// Task as it stands after the call.
    pub task: Task,
}

/// One lifecycle edge driven by [`WorkflowService`].
#[derive(Debug, Clone, Copy)]
struct Edge {
    from: TaskStatus,
    to: TaskStatus,
    notification: NotificationKind,
}

/// Drives tasks through draft, review, approval, and completion.
///
/// Reviewer consensus is delegated to the embedded [`ApprovalService`].
pub struct WorkflowService<R, D, N, C>
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
    approvals: ApprovalService<R, D, N, C>,
}

impl<R, D, N, C> WorkflowService<R, D, N, C>
where
    R: TaskRepository,
    D: UserDirectory,
    N: WorkflowNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a workflow service with default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, directory: Arc<D>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        let approvals = ApprovalService::new(
            Arc::clone(&repository),
            Arc::clone(&directory),
            Arc::clone(&notifier),
            Arc::clone(&clock),
        );
        Self {
            repository,
            directory,
            notifications: NotificationDispatcher::new(notifier, NotificationConfig::default()),
            clock,
            concurrency: ConcurrencyConfig::default(),
            approvals,
        }
    }

    /// Replaces the concurrency and notification settings.
    #[must_use]
    pub fn with_config(mut self, config: &WorkflowConfig) -> Self {
        self.concurrency = config.concurrency.clone();
        self.notifications.set_config(config.notifications.clone());
        self.approvals = self.approvals.with_config(config);
        self
    }

    /// Returns the approval engine sharing this service's ports.
    #[must_use]
    pub const fn approvals(&self) -> &ApprovalService<R, D, N, C> {
        &self.approvals
    }

    /// Creates and stores a draft task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::EmptyTaskTitle`] for blank titles,
    /// [`WorkflowDomainError::DuplicateReviewer`] when a reviewer is listed
    /// twice, and repository errors otherwise.
    pub async fn create_task(&self, request: NewTaskRequest) -> WorkflowServiceResult<Task> {
        let clock = &*self.clock;
        let mut task = Task::new(request.title, request.owner, clock)?;
        if let Some(team) = request.reviewer_team {
            task = task.with_reviewer_team(team);
        }
        for reviewer in &request.reviewers {
            task.add_reviewer(*reviewer, clock)?;
        }
        self.repository.store(&task).await?;
        info!(
            task_id = %task.id(),
            owner = %task.owner(),
            reviewers = task.reviewers().len(),
            "task created"
        );

        self.notifications
            .dispatch(NotificationEvent {
                kind: NotificationKind::ReviewerAdded,
                task: &task,
                actor: task.owner(),
                recipients: request.reviewers,
                note: None,
            })
            .await;
        Ok(task)
    }

    /// Fetches a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowServiceError::TaskNotFound`] for unknown
    /// tasks and repository errors otherwise.
    pub async fn task(&self, task_id: TaskId) -> WorkflowServiceResult<Task> {
        load_task(&*self.repository, task_id).await
    }

    /// Moves a draft task to `submitted`, clearing stale reviewer decisions.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowServiceError`] for missing tasks and
    /// infrastructure failures. Refusals are reported in the outcome.
    pub async fn submit_for_review(
        &self,
        task_id: TaskId,
        actor: &Actor,
    ) -> WorkflowServiceResult<TransitionResult> {
        let clock = &*self.clock;
        let edge = Edge {
            from: TaskStatus::Draft,
            to: TaskStatus::Submitted,
            notification: NotificationKind::TaskSubmitted,
        };
        self.transition(task_id, actor, edge, None, |task| {
            let cleared = self.approvals.reset_in_place(task);
            task.submit(actor.user_id(), clock)?;
            Ok(format!("task submitted for review; {cleared} stale decisions cleared"))
        })
        .await
    }

    /// Moves a submitted task to `in_review`.
    ///
    /// Refused with [`TransitionOutcome::NoReviewers`] when the task has no
    /// reviewer records and no reviewer team.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowServiceError`] for missing tasks and
    /// infrastructure failures. Refusals are reported in the outcome.
    pub async fn start_review(
        &self,
        task_id: TaskId,
        actor: &Actor,
    ) -> WorkflowServiceResult<TransitionResult> {
        let clock = &*self.clock;
        let edge = Edge {
            from: TaskStatus::Submitted,
            to: TaskStatus::InReview,
            notification: NotificationKind::ReviewStarted,
        };
        self.transition(task_id, actor, edge, None, |task| {
            task.start_review(actor.user_id(), clock)?;
            Ok("review started".to_owned())
        })
        .await
    }

    /// Moves an approved task to `completed`.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowServiceError`] for missing tasks and
    /// infrastructure failures. Refusals are reported in the outcome.
    pub async fn complete_task(
        &self,
        task_id: TaskId,
        actor: &Actor,
        note: Option<String>,
    ) -> WorkflowServiceResult<TransitionResult> {
        let clock = &*self.clock;
        let edge = Edge {
            from: TaskStatus::Approved,
            to: TaskStatus::Completed,
            notification: NotificationKind::TaskCompleted,
        };
        self.transition(task_id, actor, edge, note.as_deref(), |task| {
            task.complete(actor.user_id(), note.clone(), clock)?;
            Ok("task completed".to_owned())
        })
        .await
    }

    /// Returns a rejected task to `draft`.
    ///
    /// Reviewer decisions, the rejection reason, and the completion note are
    /// cleared.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowServiceError`] for missing tasks and
    /// infrastructure failures. Refusals are reported in the outcome.
    pub async fn restart_task(
        &self,
        task_id: TaskId,
        actor: &Actor,
    ) -> WorkflowServiceResult<TransitionResult> {
        let clock = &*self.clock;
        let edge = Edge {
            from: TaskStatus::Rejected,
            to: TaskStatus::Draft,
            notification: NotificationKind::TaskRestarted,
        };
        self.transition(task_id, actor, edge, None, |task| {
            let cleared = self.approvals.reset_in_place(task);
            task.restart(clock)?;
            Ok(format!("task returned to draft; {cleared} decisions cleared"))
        })
        .await
    }

    async fn transition<F>(
        &self,
        task_id: TaskId,
        actor: &Actor,
        edge: Edge,
        note: Option<&str>,
        mut apply: F,
    ) -> WorkflowServiceResult<TransitionResult>
    where
        F: FnMut(&mut Task) -> Result<String, WorkflowDomainError> + Send,
    {
        let mutator = TaskMutator::new(
            &*self.repository,
            &*self.directory,
            self.concurrency.max_conflict_retries,
        );
        let mutation = mutator
            .apply(task_id, Some(actor.user_id()), |task, membership| {
                let actual = task.status();
                if actual != edge.from {
                    return Ok(Step::Abort((
                        TransitionOutcome::WrongStatus {
                            expected: edge.from,
                            actual,
                        },
                        format!(
                            "task must be {} to move to {}, but is {actual}",
                            edge.from, edge.to
                        ),
                    )));
                }
                if edge.to == TaskStatus::InReview && !task.has_review_audience() {
                    return Ok(Step::Abort((
                        TransitionOutcome::NoReviewers,
                        format!("task {task_id} has no reviewers and no reviewer team"),
                    )));
                }
                if !task.can_transition_to(edge.to, actor, membership) {
                    return Ok(Step::Abort((
                        TransitionOutcome::NotPermitted,
                        format!(
                            "user {} may not move the task from {} to {}",
                            actor.user_id(),
                            edge.from,
                            edge.to
                        ),
                    )));
                }
                let message = apply(task)?;
                Ok(Step::Commit((TransitionOutcome::Success, message)))
            })
            .await?;
        let (outcome, message) = mutation.value;

        if !mutation.committed {
            debug!(%task_id, user_id = %actor.user_id(), reason = %message, "transition refused");
            return Ok(TransitionResult {
                outcome,
                message,
                task: mutation.task,
            });
        }

        info!(
            %task_id,
            from = %edge.from,
            to = %edge.to,
            user_id = %actor.user_id(),
            "task transitioned"
        );
        self.notifications
            .dispatch(NotificationEvent {
                kind: edge.notification,
                task: &mutation.task,
                actor: actor.user_id(),
                recipients: recipients_for(edge.notification, &mutation.task),
                note,
            })
            .await;
        Ok(TransitionResult {
            outcome,
            message,
            task: mutation.task,
        })
    }
}

fn recipients_for(kind: NotificationKind, task: &Task) -> Vec<UserId> {
    let reviewers = task.reviewers().iter().map(ReviewerRecord::user_id);
    match kind {
        NotificationKind::TaskSubmitted | NotificationKind::TaskRestarted => reviewers.collect(),
        NotificationKind::ReviewStarted | NotificationKind::TaskCompleted => {
            std::iter::once(task.owner()).chain(reviewers).collect()
        }
        NotificationKind::ReviewerAdded
        | NotificationKind::TaskApproved
        | NotificationKind::TaskRejected => vec![task.owner()],
    }
}
