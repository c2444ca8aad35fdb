//! Task aggregate root and its lifecycle transitions.

use super::{
    Actor, ReviewEligibility, ReviewerRecord, ReviewerSource, TaskId, TaskStatus, TaskTimeline,
    TeamId, TeamMembership, UserId, WorkflowDomainError,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Who performed a lifecycle transition and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionStamp {
    /// User that triggered the transition.
    pub by: UserId,
    /// Instant of the transition.
    pub at: DateTime<Utc>,
}

impl TransitionStamp {
    /// Creates a stamp for `by` at the current clock time.
    #[must_use]
    pub fn now(by: UserId, clock: &impl Clock) -> Self {
        Self { by, at: clock.utc() }
    }
}

/// Task aggregate root of the approval workflow.
///
/// The status only changes through the transition methods below, each of
/// which consults [`TaskStatus::can_transition_to`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    owner: UserId,
    status: TaskStatus,
    reviewer_team: Option<TeamId>,
    reviewers: Vec<ReviewerRecord>,
    submitted: Option<TransitionStamp>,
    reviewed: Option<TransitionStamp>,
    approved: Option<TransitionStamp>,
    rejected: Option<TransitionStamp>,
    completed: Option<TransitionStamp>,
    rejection_reason: Option<String>,
    completion_note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted owner.
    pub owner: UserId,
    /// Persisted workflow status.
    pub status: TaskStatus,
    /// Persisted reviewer team, if any.
    pub reviewer_team: Option<TeamId>,
    /// Persisted reviewer records.
    pub reviewers: Vec<ReviewerRecord>,
    /// Latest submission.
    pub submitted: Option<TransitionStamp>,
    /// Latest review start.
    pub reviewed: Option<TransitionStamp>,
    /// Latest task-level approval.
    pub approved: Option<TransitionStamp>,
    /// Latest task-level rejection.
    pub rejected: Option<TransitionStamp>,
    /// Completion.
    pub completed: Option<TransitionStamp>,
    /// Reason given with the latest rejection.
    pub rejection_reason: Option<String>,
    /// Note given on completion.
    pub completion_note: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl Task {
    /// Longest title, in characters, the task store accepts.
    pub const MAX_TITLE_LENGTH: usize = 255;

    /// Creates a new draft task owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::EmptyTaskTitle`] when the title is blank
    /// and [`WorkflowDomainError::TaskTitleTooLong`] past
    /// [`Task::MAX_TITLE_LENGTH`] characters.
    pub fn new(
        title: impl Into<String>,
        owner: UserId,
        clock: &impl Clock,
    ) -> Result<Self, WorkflowDomainError> {
        let raw_title = title.into();
        let trimmed = raw_title.trim();
        if trimmed.is_empty() {
            return Err(WorkflowDomainError::EmptyTaskTitle);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_TITLE_LENGTH {
            return Err(WorkflowDomainError::TaskTitleTooLong {
                length,
                max: Self::MAX_TITLE_LENGTH,
            });
        }
        let timestamp = clock.utc();

        Ok(Self {
            id: TaskId::new(),
            title: trimmed.to_owned(),
            owner,
            status: TaskStatus::Draft,
            reviewer_team: None,
            reviewers: Vec::new(),
            submitted: None,
            reviewed: None,
            approved: None,
            rejected: None,
            completed: None,
            rejection_reason: None,
            completion_note: None,
            created_at: timestamp,
            updated_at: timestamp,
            version: 0,
        })
    }

    /// Sets the team whose members may review without prior assignment.
    #[must_use]
    pub const fn with_reviewer_team(mut self, team: TeamId) -> Self {
        self.reviewer_team = Some(team);
        self
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            owner: data.owner,
            status: data.status,
            reviewer_team: data.reviewer_team,
            reviewers: data.reviewers,
            submitted: data.submitted,
            reviewed: data.reviewed,
            approved: data.approved,
            rejected: data.rejected,
            completed: data.completed,
            rejection_reason: data.rejection_reason,
            completion_note: data.completion_note,
            created_at: data.created_at,
            updated_at: data.updated_at,
            version: data.version,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the reviewer team, if any.
    #[must_use]
    pub const fn reviewer_team(&self) -> Option<TeamId> {
        self.reviewer_team
    }

    /// Returns the reviewer records in assignment order.
    #[must_use]
    pub fn reviewers(&self) -> &[ReviewerRecord] {
        &self.reviewers
    }

    /// Returns the reviewer record for `user_id`, if one exists.
    #[must_use]
    pub fn reviewer(&self, user_id: UserId) -> Option<&ReviewerRecord> {
        self.reviewers
            .iter()
            .find(|record| record.user_id() == user_id)
    }

    /// Returns `true` when `user_id` owns the task.
    #[must_use]
    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner == user_id
    }

    /// Returns `true` when someone can review the task, either through a
    /// reviewer record or through its reviewer team.
    #[must_use]
    pub const fn has_review_audience(&self) -> bool {
        !self.reviewers.is_empty() || self.reviewer_team.is_some()
    }

    /// Returns the latest submission stamp.
    #[must_use]
    pub const fn submitted(&self) -> Option<TransitionStamp> {
        self.submitted
    }

    /// Returns the latest review-start stamp.
    #[must_use]
    pub const fn reviewed(&self) -> Option<TransitionStamp> {
        self.reviewed
    }

    /// Returns the latest task-level approval stamp.
    #[must_use]
    pub const fn approved(&self) -> Option<TransitionStamp> {
        self.approved
    }

    /// Returns the latest task-level rejection stamp.
    #[must_use]
    pub const fn rejected(&self) -> Option<TransitionStamp> {
        self.rejected
    }

    /// Returns the completion stamp.
    #[must_use]
    pub const fn completed(&self) -> Option<TransitionStamp> {
        self.completed
    }

    /// Returns the user who submitted the task.
    #[must_use]
    pub fn submitted_by(&self) -> Option<UserId> {
        self.submitted.map(|stamp| stamp.by)
    }

    /// Returns when the task was submitted.
    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted.map(|stamp| stamp.at)
    }

    /// Returns the user who opened the review.
    #[must_use]
    pub fn reviewed_by(&self) -> Option<UserId> {
        self.reviewed.map(|stamp| stamp.by)
    }

    /// Returns when the review was opened.
    #[must_use]
    pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed.map(|stamp| stamp.at)
    }

    /// Returns the reviewer whose approval completed the consensus.
    #[must_use]
    pub fn approved_by(&self) -> Option<UserId> {
        self.approved.map(|stamp| stamp.by)
    }

    /// Returns when the task was approved.
    #[must_use]
    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved.map(|stamp| stamp.at)
    }

    /// Returns the reviewer who rejected the task.
    #[must_use]
    pub fn rejected_by(&self) -> Option<UserId> {
        self.rejected.map(|stamp| stamp.by)
    }

    /// Returns when the task was rejected.
    #[must_use]
    pub fn rejected_at(&self) -> Option<DateTime<Utc>> {
        self.rejected.map(|stamp| stamp.at)
    }

    /// Returns the user who completed the task.
    #[must_use]
    pub fn completed_by(&self) -> Option<UserId> {
        self.completed.map(|stamp| stamp.by)
    }

    /// Returns when the task was completed.
    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed.map(|stamp| stamp.at)
    }

    /// Returns the reason given with the latest rejection.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    /// Returns the completion note.
    #[must_use]
    pub fn completion_note(&self) -> Option<&str> {
        self.completion_note.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the optimistic concurrency version this copy was loaded at.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the audit timeline projection of this task.
    #[must_use]
    pub const fn timeline(&self) -> TaskTimeline<'_> {
        TaskTimeline::new(self)
    }

    /// Decides whether `actor` may move the task to `target`.
    ///
    /// The edge must exist in the transition table and the actor must hold
    /// the capability for it: owners and privileged users drive submission,
    /// completion, and restart; reviewers (assigned or via team membership)
    /// and privileged users open the review; only reviewers decide it.
    #[must_use]
    pub fn can_transition_to(
        &self,
        target: TaskStatus,
        actor: &Actor,
        membership: TeamMembership,
    ) -> bool {
        if !self.status.can_transition_to(target) {
            return false;
        }
        let is_owner = self.is_owner(actor.user_id());
        let is_reviewer = self.reviewer(actor.user_id()).is_some()
            || (self.reviewer_team.is_some() && membership.is_member());

        match target {
            TaskStatus::Submitted | TaskStatus::Completed | TaskStatus::Draft => {
                is_owner || actor.is_privileged()
            }
            TaskStatus::InReview => {
                self.has_review_audience() && (is_reviewer || actor.is_privileged())
            }
            TaskStatus::Approved | TaskStatus::Rejected => is_reviewer,
        }
    }

    /// Checks whether `user_id` may approve or reject the task now.
    ///
    /// Reviews are only accepted in [`TaskStatus::InReview`]. A user with a
    /// record must not have acted yet; a user without one qualifies only
    /// through membership of the task's reviewer team.
    #[must_use]
    pub fn review_eligibility(
        &self,
        user_id: UserId,
        membership: TeamMembership,
    ) -> ReviewEligibility {
        if self.status != TaskStatus::InReview {
            return ReviewEligibility::WrongStatus(self.status);
        }
        match self.reviewer(user_id) {
            Some(record) if record.has_approved() => ReviewEligibility::AlreadyApproved,
            Some(record) if record.has_rejected() => ReviewEligibility::AlreadyRejected,
            Some(_) => ReviewEligibility::Eligible(ReviewerSource::Direct),
            None if self.reviewer_team.is_some() && membership.is_member() => {
                ReviewEligibility::Eligible(ReviewerSource::Team)
            }
            None => ReviewEligibility::NotAReviewer,
        }
    }

    /// Returns the user's record, materialising one for reviewer-team
    /// members that lack a direct record.
    pub(crate) fn resolve_or_create_reviewer(
        &mut self,
        user_id: UserId,
        membership: TeamMembership,
        clock: &impl Clock,
    ) -> Option<ReviewerRecord> {
        if let Some(existing) = self.reviewer(user_id) {
            return Some(existing.clone());
        }
        if self.reviewer_team.is_none() || !membership.is_member() {
            return None;
        }
        self.add_reviewer(user_id, clock).ok()
    }

    pub(crate) fn submit(
        &mut self,
        by: UserId,
        clock: &impl Clock,
    ) -> Result<(), WorkflowDomainError> {
        self.transition_to(TaskStatus::Submitted)?;
        self.submitted = Some(TransitionStamp::now(by, clock));
        self.touch(clock);
        Ok(())
    }

    pub(crate) fn start_review(
        &mut self,
        by: UserId,
        clock: &impl Clock,
    ) -> Result<(), WorkflowDomainError> {
        if !self.has_review_audience() {
            return Err(WorkflowDomainError::NoReviewers { task_id: self.id });
        }
        self.transition_to(TaskStatus::InReview)?;
        self.reviewed = Some(TransitionStamp::now(by, clock));
        self.touch(clock);
        Ok(())
    }

    pub(crate) fn mark_approved(
        &mut self,
        by: UserId,
        clock: &impl Clock,
    ) -> Result<(), WorkflowDomainError> {
        self.transition_to(TaskStatus::Approved)?;
        self.approved = Some(TransitionStamp::now(by, clock));
        self.touch(clock);
        Ok(())
    }

    pub(crate) fn mark_rejected(
        &mut self,
        by: UserId,
        reason: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), WorkflowDomainError> {
        self.transition_to(TaskStatus::Rejected)?;
        self.rejected = Some(TransitionStamp::now(by, clock));
        self.rejection_reason = reason;
        self.touch(clock);
        Ok(())
    }

    pub(crate) fn complete(
        &mut self,
        by: UserId,
        note: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), WorkflowDomainError> {
        self.transition_to(TaskStatus::Completed)?;
        self.completed = Some(TransitionStamp::now(by, clock));
        self.completion_note = note;
        self.touch(clock);
        Ok(())
    }

    pub(crate) fn restart(&mut self, clock: &impl Clock) -> Result<(), WorkflowDomainError> {
        self.transition_to(TaskStatus::Draft)?;
        self.rejection_reason = None;
        self.completion_note = None;
        self.touch(clock);
        Ok(())
    }

    /// Attaches a pending reviewer with the next `order` value.
    pub(crate) fn add_reviewer(
        &mut self,
        user_id: UserId,
        clock: &impl Clock,
    ) -> Result<ReviewerRecord, WorkflowDomainError> {
        if !self.status.accepts_new_reviewers() {
            return Err(self.reviewer_set_locked());
        }
        if self.reviewer(user_id).is_some() {
            return Err(WorkflowDomainError::DuplicateReviewer {
                task_id: self.id,
                user_id,
            });
        }
        let order = u32::try_from(self.reviewers.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1);
        let record = ReviewerRecord::new(user_id, order, clock.utc());
        self.reviewers.push(record.clone());
        self.touch(clock);
        Ok(record)
    }

    const fn reviewer_set_locked(&self) -> WorkflowDomainError {
        WorkflowDomainError::ReviewerSetLocked {
            task_id: self.id,
            status: self.status,
        }
    }

    /// Detaches a reviewer, discarding any decision it held.
    pub(crate) fn remove_reviewer(
        &mut self,
        user_id: UserId,
        clock: &impl Clock,
    ) -> Result<ReviewerRecord, WorkflowDomainError> {
        if !self.status.accepts_reviewer_removal() {
            return Err(self.reviewer_set_locked());
        }
        let position = self
            .reviewers
            .iter()
            .position(|record| record.user_id() == user_id)
            .ok_or(WorkflowDomainError::ReviewerNotFound {
                task_id: self.id,
                user_id,
            })?;
        let removed = self.reviewers.remove(position);
        self.touch(clock);
        Ok(removed)
    }

    pub(crate) fn reviewer_mut(&mut self, user_id: UserId) -> Option<&mut ReviewerRecord> {
        self.reviewers
            .iter_mut()
            .find(|record| record.user_id() == user_id)
    }

    /// Clears every reviewer decision and returns how many were cleared.
    pub(crate) fn reset_reviewer_decisions(&mut self, clock: &impl Clock) -> usize {
        let reset = self
            .reviewers
            .iter_mut()
            .map(ReviewerRecord::reset)
            .filter(|was_reset| *was_reset)
            .count();
        if reset > 0 {
            self.touch(clock);
        }
        reset
    }

    pub(crate) const fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub(crate) fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }

    fn transition_to(&mut self, target: TaskStatus) -> Result<(), WorkflowDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(WorkflowDomainError::InvalidStatusTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }
}
