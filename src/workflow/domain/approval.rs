//! Reviewer consensus: derived approval status and review outcomes.

use super::{ReviewerRecord, TaskStatus, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate snapshot of reviewer consensus, computed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStatus {
    /// Number of reviewer records.
    pub total_reviewers: usize,
    /// Reviewers that approved.
    pub approved_count: usize,
    /// Reviewers that rejected.
    pub rejected_count: usize,
    /// Reviewers that have not acted.
    pub pending_count: usize,
    /// Every reviewer approved and there is at least one.
    pub is_complete: bool,
    /// At least one reviewer rejected.
    pub is_rejected: bool,
    /// Floor of the approved share, in percent. Zero with no reviewers.
    pub progress_percent: u8,
    /// Users still to act, in record order.
    pub pending_reviewers: Vec<UserId>,
    /// Users that approved, in record order.
    pub approved_reviewers: Vec<UserId>,
    /// Users that rejected, in record order.
    pub rejected_reviewers: Vec<UserId>,
}

impl ApprovalStatus {
    /// Partitions reviewer records into the approval snapshot.
    #[must_use]
    pub fn from_reviewers(reviewers: &[ReviewerRecord]) -> Self {
        let mut pending_reviewers = Vec::new();
        let mut approved_reviewers = Vec::new();
        let mut rejected_reviewers = Vec::new();
        for record in reviewers {
            if record.has_approved() {
                approved_reviewers.push(record.user_id());
            } else if record.has_rejected() {
                rejected_reviewers.push(record.user_id());
            } else {
                pending_reviewers.push(record.user_id());
            }
        }

        let total_reviewers = reviewers.len();
        let approved_count = approved_reviewers.len();
        let rejected_count = rejected_reviewers.len();
        Self {
            total_reviewers,
            approved_count,
            rejected_count,
            pending_count: pending_reviewers.len(),
            is_complete: total_reviewers > 0 && approved_count == total_reviewers,
            is_rejected: rejected_count > 0,
            progress_percent: progress_percent(approved_count, total_reviewers),
            pending_reviewers,
            approved_reviewers,
            rejected_reviewers,
        }
    }
}

fn progress_percent(approved: usize, total: usize) -> u8 {
    approved
        .saturating_mul(100)
        .checked_div(total)
        .and_then(|percent| u8::try_from(percent).ok())
        .unwrap_or(0)
}

/// Task status change implied by a consensus snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsensusDecision {
    /// Every reviewer approved.
    Approve,
    /// A reviewer rejected. Overrides any number of approvals.
    Reject,
}

impl ConsensusDecision {
    /// Returns the task status this decision moves to.
    #[must_use]
    pub const fn target_status(self) -> TaskStatus {
        match self {
            Self::Approve => TaskStatus::Approved,
            Self::Reject => TaskStatus::Rejected,
        }
    }
}

/// Evaluates whether a snapshot crosses an auto-transition threshold.
#[must_use]
pub const fn consensus_decision(status: &ApprovalStatus) -> Option<ConsensusDecision> {
    if status.is_rejected {
        Some(ConsensusDecision::Reject)
    } else if status.is_complete {
        Some(ConsensusDecision::Approve)
    } else {
        None
    }
}

/// How an eligible user qualifies as a reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewerSource {
    /// The user already has a reviewer record.
    Direct,
    /// The user qualifies through reviewer-team membership.
    Team,
}

/// Result of checking whether a user may approve or reject a task now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewEligibility {
    /// The user may act.
    Eligible(ReviewerSource),
    /// The task is not in review.
    WrongStatus(TaskStatus),
    /// The user already approved.
    AlreadyApproved,
    /// The user already rejected.
    AlreadyRejected,
    /// The user is neither assigned nor a reviewer-team member.
    NotAReviewer,
}

impl ReviewEligibility {
    /// Returns `true` for [`ReviewEligibility::Eligible`].
    #[must_use]
    pub const fn is_eligible(self) -> bool {
        matches!(self, Self::Eligible(_))
    }

    /// Returns a human-readable reason.
    #[must_use]
    pub fn reason(self) -> String {
        match self {
            Self::Eligible(ReviewerSource::Direct) => "user is an assigned reviewer".to_owned(),
            Self::Eligible(ReviewerSource::Team) => {
                "user is a member of the reviewer team".to_owned()
            }
            Self::WrongStatus(status) => {
                format!("task is {status}, reviews are only accepted while in_review")
            }
            Self::AlreadyApproved => "user has already approved this task".to_owned(),
            Self::AlreadyRejected => "user has already rejected this task".to_owned(),
            Self::NotAReviewer => "user is not a reviewer of this task".to_owned(),
        }
    }

    /// Maps an ineligible check onto the matching review outcome.
    #[must_use]
    pub const fn refusal(self) -> Option<ReviewOutcome> {
        match self {
            Self::Eligible(_) => None,
            Self::WrongStatus(_) => Some(ReviewOutcome::WrongStatus),
            Self::AlreadyApproved => Some(ReviewOutcome::AlreadyApproved),
            Self::AlreadyRejected => Some(ReviewOutcome::AlreadyRejected),
            Self::NotAReviewer => Some(ReviewOutcome::NotAReviewer),
        }
    }
}

/// Typed result of an approve or reject call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewOutcome {
    /// Decision recorded; other reviewers are still pending.
    Success,
    /// Decision recorded and every reviewer has now approved.
    AllApproved,
    /// Rejection recorded and the task moved to `rejected`.
    TaskRejected,
    /// The reviewer had already approved.
    AlreadyApproved,
    /// The reviewer had already rejected.
    AlreadyRejected,
    /// The task is not in review.
    WrongStatus,
    /// The user is not a reviewer.
    NotAReviewer,
}

impl ReviewOutcome {
    /// Returns the stable outcome code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::AllApproved => "ALL_APPROVED",
            Self::TaskRejected => "TASK_REJECTED",
            Self::AlreadyApproved => "ALREADY_APPROVED",
            Self::AlreadyRejected => "ALREADY_REJECTED",
            Self::WrongStatus => "WRONG_STATUS",
            Self::NotAReviewer => "NOT_A_REVIEWER",
        }
    }

    /// Returns `true` when the decision was recorded.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::AllApproved | Self::TaskRejected)
    }
}

impl fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
