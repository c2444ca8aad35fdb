//! Diesel row models for workflow persistence.

use super::schema::{task_reviewers, workflow_tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Query result row for task records.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = workflow_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Owning user.
    pub owner_id: Uuid,
    /// Workflow status.
    pub status: String,
    /// Optional reviewer team.
    pub reviewer_team_id: Option<Uuid>,
    /// Latest submitter.
    pub submitted_by: Option<Uuid>,
    /// Latest submission time.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Latest review opener.
    pub reviewed_by: Option<Uuid>,
    /// Latest review start time.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer completing the consensus.
    pub approved_by: Option<Uuid>,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Rejecting reviewer.
    pub rejected_by: Option<Uuid>,
    /// Rejection time.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Completing user.
    pub completed_by: Option<Uuid>,
    /// Completion time.
    pub completed_at: Option<DateTime<Utc>>,
    /// Reason given with the rejection.
    pub rejection_reason: Option<String>,
    /// Note given on completion.
    pub completion_note: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency version.
    pub version: i64,
}

/// Insert and update model for task records.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, AsChangeset)]
#[diesel(table_name = workflow_tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskRecord {
    /// Task identifier.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Owning user.
    pub owner_id: Uuid,
    /// Workflow status.
    pub status: String,
    /// Optional reviewer team.
    pub reviewer_team_id: Option<Uuid>,
    /// Latest submitter.
    pub submitted_by: Option<Uuid>,
    /// Latest submission time.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Latest review opener.
    pub reviewed_by: Option<Uuid>,
    /// Latest review start time.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer completing the consensus.
    pub approved_by: Option<Uuid>,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Rejecting reviewer.
    pub rejected_by: Option<Uuid>,
    /// Rejection time.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Completing user.
    pub completed_by: Option<Uuid>,
    /// Completion time.
    pub completed_at: Option<DateTime<Utc>>,
    /// Reason given with the rejection.
    pub rejection_reason: Option<String>,
    /// Note given on completion.
    pub completion_note: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency version.
    pub version: i64,
}

/// Row model for reviewer records, used for both reads and inserts.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_reviewers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewerRow {
    /// Owning task.
    pub task_id: Uuid,
    /// Reviewing user.
    pub user_id: Uuid,
    /// Informational sequencing hint.
    pub review_order: i32,
    /// Assignment time.
    pub assigned_at: DateTime<Utc>,
    /// Approval flag.
    pub has_approved: bool,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Approval note.
    pub approval_note: Option<String>,
    /// Rejection flag.
    pub has_rejected: bool,
    /// Rejection time.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Rejection note.
    pub rejection_note: Option<String>,
}
