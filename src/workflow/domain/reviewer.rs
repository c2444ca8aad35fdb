//! Per-reviewer approval state.

use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Decision a single reviewer has recorded on a task.
///
/// Approval and rejection are variants of one value, so a record can never
/// be both approved and rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReviewDecision {
    /// The reviewer has not acted yet.
    Pending,
    /// The reviewer approved.
    Approved {
        /// When the approval was recorded.
        at: DateTime<Utc>,
        /// Optional approval note.
        note: Option<String>,
    },
    /// The reviewer rejected.
    Rejected {
        /// When the rejection was recorded.
        at: DateTime<Utc>,
        /// Optional rejection note.
        note: Option<String>,
    },
}

/// One reviewer's approval or rejection state for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerRecord {
    user_id: UserId,
    order: u32,
    assigned_at: DateTime<Utc>,
    decision: ReviewDecision,
}

impl ReviewerRecord {
    /// Creates a pending reviewer record.
    #[must_use]
    pub const fn new(user_id: UserId, order: u32, assigned_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            order,
            assigned_at,
            decision: ReviewDecision::Pending,
        }
    }

    /// Reconstructs a reviewer record from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        user_id: UserId,
        order: u32,
        assigned_at: DateTime<Utc>,
        decision: ReviewDecision,
    ) -> Self {
        Self {
            user_id,
            order,
            assigned_at,
            decision,
        }
    }

    /// Returns the reviewing user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the informational sequencing hint (1-based).
    #[must_use]
    pub const fn order(&self) -> u32 {
        self.order
    }

    /// Returns when the reviewer was attached to the task.
    #[must_use]
    pub const fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }

    /// Returns the recorded decision.
    #[must_use]
    pub const fn decision(&self) -> &ReviewDecision {
        &self.decision
    }

    /// Returns `true` when the reviewer approved.
    #[must_use]
    pub const fn has_approved(&self) -> bool {
        matches!(self.decision, ReviewDecision::Approved { .. })
    }

    /// Returns `true` when the reviewer rejected.
    #[must_use]
    pub const fn has_rejected(&self) -> bool {
        matches!(self.decision, ReviewDecision::Rejected { .. })
    }

    /// Returns `true` when the reviewer has not acted.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.decision, ReviewDecision::Pending)
    }

    /// Returns the approval timestamp, if approved.
    #[must_use]
    pub const fn approved_at(&self) -> Option<DateTime<Utc>> {
        match self.decision {
            ReviewDecision::Approved { at, .. } => Some(at),
            _ => None,
        }
    }

    /// Returns the approval note, if approved with one.
    #[must_use]
    pub fn approval_note(&self) -> Option<&str> {
        match &self.decision {
            ReviewDecision::Approved { note, .. } => note.as_deref(),
            _ => None,
        }
    }

    /// Returns the rejection timestamp, if rejected.
    #[must_use]
    pub const fn rejected_at(&self) -> Option<DateTime<Utc>> {
        match self.decision {
            ReviewDecision::Rejected { at, .. } => Some(at),
            _ => None,
        }
    }

    /// Returns the rejection note, if rejected with one.
    #[must_use]
    pub fn rejection_note(&self) -> Option<&str> {
        match &self.decision {
            ReviewDecision::Rejected { note, .. } => note.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn record_approval(&mut self, at: DateTime<Utc>, note: Option<String>) {
        self.decision = ReviewDecision::Approved { at, note };
    }

    pub(crate) fn record_rejection(&mut self, at: DateTime<Utc>, note: Option<String>) {
        self.decision = ReviewDecision::Rejected { at, note };
    }

    /// Clears any decision. Returns `true` when there was one to clear.
    pub(crate) fn reset(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        self.decision = ReviewDecision::Pending;
        true
    }
}
